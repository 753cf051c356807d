use sqlx::PgPool;

use crate::models::{Fields, Submission};
use crate::token::Token;

const COLUMNS: &str = "token, primary_payload, secondary_payload, created_at";

pub async fn create(
    pool: &PgPool,
    token: &Token,
    primary_payload: &Fields,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (token, primary_payload)
         VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(token)
    .bind(sqlx::types::Json(super::strip_nul_fields(primary_payload)))
    .fetch_one(pool)
    .await
}

pub async fn find_by_token(pool: &PgPool, token: &Token) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE token = $1"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await
}

/// Overwrite the survey payload. Returns the number of rows touched.
pub async fn update_secondary(
    pool: &PgPool,
    token: &Token,
    payload: &serde_json::Value,
) -> Result<u64, sqlx::Error> {
    let mut payload = payload.clone();
    super::strip_nul(&mut payload);

    let result = sqlx::query("UPDATE submissions SET secondary_payload = $2 WHERE token = $1")
        .bind(token)
        .bind(payload)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, token: &Token) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM submissions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
