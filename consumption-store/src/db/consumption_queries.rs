use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Duration, OffsetDateTime};

use crate::domain::{Aggregation, ConsumptionRecord, DailySummary};

/// Upper bound on rows returned by [`query_records`].
pub const QUERY_ROW_CAP: i64 = 1000;

/// Optional constraints for [`query_records`]. Absent fields impose none.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub metering_point: Option<String>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub aggregation: Aggregation,
}

/// Insert or update a batch of records in one transaction. Conflicts on the
/// (metering point, timestamp, aggregation level) key overwrite the measured
/// values and bump `updated_at`; any failure rolls the whole batch back.
pub async fn upsert_records(
    pool: &PgPool,
    records: &[ConsumptionRecord],
) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut stored = 0u64;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT INTO consumption_data
                (metering_point_id, timestamp, aggregation_level,
                 quantity, quality, business_type, measurement_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (metering_point_id, timestamp, aggregation_level)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                quality = EXCLUDED.quality,
                measurement_unit = EXCLUDED.measurement_unit,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.metering_point_id)
        .bind(record.timestamp)
        .bind(&record.aggregation_level)
        .bind(record.quantity)
        .bind(&record.quality)
        .bind(&record.business_type)
        .bind(&record.measurement_unit)
        .execute(&mut *tx)
        .await?;

        stored += result.rows_affected();
    }

    tx.commit().await?;
    Ok(stored)
}

/// Fetch stored records matching `filter`, newest first, capped at
/// [`QUERY_ROW_CAP`] rows.
pub async fn query_records(
    pool: &PgPool,
    filter: &RecordFilter,
) -> Result<Vec<ConsumptionRecord>, sqlx::Error> {
    let mut builder = records_query(filter);
    builder
        .build_query_as::<ConsumptionRecord>()
        .fetch_all(pool)
        .await
}

fn records_query<'a>(filter: &'a RecordFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT metering_point_id, timestamp, aggregation_level, \
         quantity, quality, business_type, measurement_unit \
         FROM consumption_data WHERE aggregation_level = ",
    );
    builder.push_bind(filter.aggregation.to_string());

    if let Some(metering_point) = &filter.metering_point {
        builder.push(" AND metering_point_id = ").push_bind(metering_point);
    }
    if let Some(from) = filter.from {
        builder.push(" AND timestamp >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND timestamp <= ").push_bind(to);
    }

    builder.push(" ORDER BY timestamp DESC LIMIT ").push_bind(QUERY_ROW_CAP);
    builder
}

/// Per-day totals over the trailing `period_days` window, newest day first.
pub async fn daily_summary(
    pool: &PgPool,
    metering_point: Option<&str>,
    period_days: i64,
) -> Result<Vec<DailySummary>, sqlx::Error> {
    let cutoff = summary_window_start(OffsetDateTime::now_utc(), period_days);
    let mut builder = summary_query(metering_point, cutoff);
    builder
        .build_query_as::<DailySummary>()
        .fetch_all(pool)
        .await
}

fn summary_query(
    metering_point: Option<&str>,
    cutoff: OffsetDateTime,
) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT CAST(timestamp AS DATE) AS date, \
         SUM(quantity) AS total_consumption, \
         AVG(quantity) AS avg_consumption, \
         COUNT(*) AS data_points \
         FROM consumption_data WHERE timestamp >= ",
    );
    builder.push_bind(cutoff);

    if let Some(metering_point) = metering_point {
        builder.push(" AND metering_point_id = ").push_bind(metering_point);
    }

    builder.push(" GROUP BY CAST(timestamp AS DATE) ORDER BY date DESC");
    builder
}

/// UTC midnight `period_days` days before `now`. Bound as a parameter so the
/// day count never reaches the SQL text.
pub fn summary_window_start(now: OffsetDateTime, period_days: i64) -> OffsetDateTime {
    now.date()
        .saturating_sub(Duration::days(period_days))
        .midnight()
        .assume_utc()
}
