//! Append-only record of webhook invocations.
//!
//! Sinks never fail the request: write errors are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db;
use crate::models::WebhookDelivery;

#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn record(&self, delivery: &WebhookDelivery);
}

/// Emits each delivery as a structured `tracing` event.
pub struct TracingSink;

#[async_trait]
impl DiagnosticSink for TracingSink {
    async fn record(&self, delivery: &WebhookDelivery) {
        let payload = delivery
            .payload
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_default();
        let query = serde_json::to_string(&delivery.query_params).unwrap_or_default();

        tracing::info!(
            target: "webhook_delivery",
            received_at = %delivery.received_at.to_rfc3339(),
            raw_body = %delivery.raw_body,
            payload = %payload,
            query_params = %query,
            submission_id = delivery.submission_id.as_deref().unwrap_or(""),
            source = delivery.source.as_deref().unwrap_or(""),
            outcome = %delivery.outcome,
            status_code = delivery.status_code,
            detail = delivery.detail.as_deref().unwrap_or(""),
            "webhook delivery"
        );
    }
}

/// Stores deliveries in the `webhook_deliveries` table.
pub struct DatabaseSink {
    pool: PgPool,
    timeout: Duration,
}

impl DatabaseSink {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl DiagnosticSink for DatabaseSink {
    async fn record(&self, delivery: &WebhookDelivery) {
        let mut row = delivery.clone();
        db::strip_nul_str(&mut row.raw_body);
        if let Some(payload) = row.payload.as_mut() {
            db::strip_nul(payload);
        }
        row.query_params = row
            .query_params
            .into_iter()
            .map(|(mut k, mut v)| {
                db::strip_nul_str(&mut k);
                db::strip_nul_str(&mut v);
                (k, v)
            })
            .collect();
        if let Some(id) = row.submission_id.as_mut() {
            db::strip_nul_str(id);
        }

        match tokio::time::timeout(self.timeout, db::webhook_deliveries::create(&self.pool, &row))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to record webhook delivery: {e}"),
            Err(_) => tracing::error!("Timed out recording webhook delivery"),
        }
    }
}

pub struct NoopSink;

#[async_trait]
impl DiagnosticSink for NoopSink {
    async fn record(&self, _delivery: &WebhookDelivery) {}
}

/// Fan out to several sinks in order.
pub struct MultiSink(pub Vec<Arc<dyn DiagnosticSink>>);

#[async_trait]
impl DiagnosticSink for MultiSink {
    async fn record(&self, delivery: &WebhookDelivery) {
        for sink in &self.0 {
            sink.record(delivery).await;
        }
    }
}
