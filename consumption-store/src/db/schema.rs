//! PostgreSQL schema definition

use sqlx::PgPool;

/// SQL schema for the consumption database, applied idempotently at startup.
pub const SCHEMA_SQL: &str = r#"
-- Singleton credential row; seeded below so UPDATEs always have a target.
CREATE TABLE IF NOT EXISTS app_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    refresh_token TEXT,
    access_token TEXT,
    token_expires_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
);

INSERT INTO app_config (id) VALUES (1) ON CONFLICT (id) DO NOTHING;

-- Normalized time-series readings. Re-ingesting the same key overwrites the
-- measured values instead of duplicating the row.
CREATE TABLE IF NOT EXISTS consumption_data (
    metering_point_id TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    aggregation_level TEXT NOT NULL,
    quantity DOUBLE PRECISION,
    quality TEXT,
    business_type TEXT,
    measurement_unit TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (metering_point_id, timestamp, aggregation_level)
);

CREATE INDEX IF NOT EXISTS consumption_data_timestamp_idx
    ON consumption_data (timestamp);
"#;

pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
