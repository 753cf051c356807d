use sqlx::PgPool;

use crate::models::WebhookDelivery;

pub async fn create(pool: &PgPool, delivery: &WebhookDelivery) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO webhook_deliveries
            (received_at, raw_body, payload, query_params, submission_id, source, outcome, status_code, detail)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(delivery.received_at)
    .bind(&delivery.raw_body)
    .bind(&delivery.payload)
    .bind(sqlx::types::Json(&delivery.query_params))
    .bind(&delivery.submission_id)
    .bind(&delivery.source)
    .bind(&delivery.outcome)
    .bind(delivery.status_code as i16)
    .bind(&delivery.detail)
    .execute(pool)
    .await?;
    Ok(())
}
