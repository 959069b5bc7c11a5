use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::AppConfigRow;

/// Read the singleton config row. The row is seeded by `init_schema`.
pub async fn fetch(pool: &PgPool) -> Result<AppConfigRow, sqlx::Error> {
    sqlx::query_as::<_, AppConfigRow>(
        r#"
        SELECT refresh_token, access_token, token_expires_at
        FROM app_config
        WHERE id = 1
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn is_configured(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let row = fetch(pool).await?;
    Ok(row.refresh_token.is_some_and(|t| !t.is_empty()))
}

pub async fn set_refresh_token(pool: &PgPool, refresh_token: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE app_config
        SET refresh_token = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = 1
        "#,
    )
    .bind(refresh_token)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_access_token(
    pool: &PgPool,
    access_token: &str,
    expires_at: OffsetDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE app_config
        SET access_token = $1, token_expires_at = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = 1
        "#,
    )
    .bind(access_token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}
