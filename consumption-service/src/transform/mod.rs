//! Flattens Eloverblik time-series documents into storable records.

use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime};

use consumption_store::{Aggregation, ConsumptionRecord};

use crate::eloverblik::types::TimeSeries;

/// Result of normalizing one document. `skipped` counts points that could
/// not be placed on the timeline (missing or unparseable period start,
/// missing position); they are dropped rather than failing the batch.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<ConsumptionRecord>,
    pub skipped: usize,
}

/// Flatten `series` into records for `metering_point_id`.
///
/// Each point lands at `period start + (position - 1)` steps of the
/// aggregation unit. A point whose quantity is absent or unparseable still
/// produces a record with a null quantity; quality, business type and
/// measurement unit are carried through from the source document.
pub fn normalize_series(
    metering_point_id: &str,
    series: &[TimeSeries],
    aggregation: Aggregation,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for ts in series {
        for period in &ts.periods {
            let start = period
                .time_interval
                .as_ref()
                .and_then(|interval| interval.start.as_deref())
                .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok());

            let Some(start) = start else {
                batch.skipped += period.points.len();
                continue;
            };

            for point in &period.points {
                let timestamp = point
                    .position
                    .and_then(|position| point_timestamp(start, position, aggregation));

                let Some(timestamp) = timestamp else {
                    batch.skipped += 1;
                    continue;
                };

                batch.records.push(ConsumptionRecord {
                    metering_point_id: metering_point_id.to_string(),
                    timestamp,
                    aggregation_level: aggregation.to_string(),
                    quantity: point.quantity,
                    quality: point.quality.clone(),
                    business_type: ts.business_type.clone(),
                    measurement_unit: ts.measurement_unit.clone(),
                });
            }
        }
    }

    batch
}

/// Timestamp of the point at 1-based `position` within a period starting at
/// `start`. Hour and Day steps are fixed-width; Month and Year follow the
/// calendar, clamping the day on shorter months. Position 0 is invalid.
pub fn point_timestamp(
    start: OffsetDateTime,
    position: u32,
    aggregation: Aggregation,
) -> Option<OffsetDateTime> {
    let steps = i64::from(position.checked_sub(1)?);

    match aggregation {
        Aggregation::Hour => start.checked_add(Duration::hours(steps)),
        Aggregation::Day => start.checked_add(Duration::days(steps)),
        Aggregation::Month => add_months(start, steps),
        Aggregation::Year => add_months(start, steps.checked_mul(12)?),
    }
}

fn add_months(start: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let zero_based = i64::from(u8::from(start.month())) - 1 + months;
    let year = i32::try_from(i64::from(start.year()) + zero_based.div_euclid(12)).ok()?;
    let month = Month::try_from(zero_based.rem_euclid(12) as u8 + 1).ok()?;

    let day = start.day().min(time::util::days_in_year_month(year, month));
    let date = Date::from_calendar_date(year, month, day).ok()?;

    Some(date.with_time(start.time()).assume_offset(start.offset()))
}
