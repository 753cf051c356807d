//! Merging survey webhooks into the landing-form submission they belong to.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::correlation::{self, QueryParams};
use crate::diagnostics::DiagnosticSink;
use crate::models::WebhookDelivery;
use crate::store::SubmissionStore;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Ok {
        token: Token,
        rows_updated: u64,
    },
    /// Body was empty, not JSON, or not a JSON object.
    InvalidPayload { raw_body: String, query: QueryParams },
    /// Body exceeded the configured size limit and was not read.
    PayloadTooLarge { query: QueryParams },
    /// The payload parsed but carried no token anywhere we look.
    MissingToken { payload: Value, query: QueryParams },
    /// Unknown token; expected when the webhook beats the intake commit.
    NotFound { token: Token },
    InternalError {
        token: Token,
        error: &'static str,
        detail: String,
    },
}

impl ReconcileOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ReconcileOutcome::Ok { .. } => StatusCode::OK,
            ReconcileOutcome::InvalidPayload { .. } | ReconcileOutcome::MissingToken { .. } => {
                StatusCode::BAD_REQUEST
            }
            ReconcileOutcome::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ReconcileOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
            ReconcileOutcome::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Ok { .. } => "updated",
            ReconcileOutcome::InvalidPayload { .. } => "invalid_payload",
            ReconcileOutcome::PayloadTooLarge { .. } => "payload_too_large",
            ReconcileOutcome::MissingToken { .. } => "missing_submission_id",
            ReconcileOutcome::NotFound { .. } => "unknown_submission_id",
            ReconcileOutcome::InternalError { .. } => "store_error",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ReconcileOutcome::Ok {
                token,
                rows_updated,
            } => json!({
                "success": true,
                "submission_id": token,
                "updated_rows": rows_updated,
            }),
            ReconcileOutcome::InvalidPayload { raw_body, query } => json!({
                "error": "invalid payload",
                "received_data": { "raw": raw_body, "query": query },
            }),
            ReconcileOutcome::PayloadTooLarge { query } => json!({
                "error": "payload too large",
                "received_data": { "query": query },
            }),
            ReconcileOutcome::MissingToken { payload, query } => json!({
                "error": "no submission_id found",
                "received_data": { "json": payload, "query": query },
            }),
            ReconcileOutcome::NotFound { token } => json!({
                "error": "submission_id not found",
                "submission_id": token,
            }),
            ReconcileOutcome::InternalError {
                token,
                error,
                detail,
            } => json!({
                "error": error,
                "submission_id": token,
                "detail": detail,
            }),
        }
    }

    fn token(&self) -> Option<&Token> {
        match self {
            ReconcileOutcome::Ok { token, .. }
            | ReconcileOutcome::NotFound { token }
            | ReconcileOutcome::InternalError { token, .. } => Some(token),
            ReconcileOutcome::InvalidPayload { .. }
            | ReconcileOutcome::PayloadTooLarge { .. }
            | ReconcileOutcome::MissingToken { .. } => None,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ReconcileOutcome::InternalError { detail, .. } => Some(detail.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ReconcileOutcome {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

pub struct WebhookReconciler {
    store: Arc<dyn SubmissionStore>,
    sink: Arc<dyn DiagnosticSink>,
}

impl WebhookReconciler {
    pub fn new(store: Arc<dyn SubmissionStore>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { store, sink }
    }

    /// Run one webhook delivery to completion and record it.
    pub async fn reconcile(&self, raw_body: &[u8], query: &QueryParams) -> ReconcileOutcome {
        let payload = parse_payload(raw_body);
        let (outcome, source) = self.resolve_and_store(raw_body, payload.as_ref(), query).await;
        self.finish(outcome, raw_body, payload, query, source).await
    }

    /// Record a delivery whose body could not be read at all.
    pub async fn reject_unreadable(
        &self,
        status: StatusCode,
        query: &QueryParams,
    ) -> ReconcileOutcome {
        let outcome = if status == StatusCode::PAYLOAD_TOO_LARGE {
            ReconcileOutcome::PayloadTooLarge {
                query: query.clone(),
            }
        } else {
            ReconcileOutcome::InvalidPayload {
                raw_body: String::new(),
                query: query.clone(),
            }
        };
        self.finish(outcome, b"", None, query, None).await
    }

    async fn finish(
        &self,
        outcome: ReconcileOutcome,
        raw_body: &[u8],
        payload: Option<Value>,
        query: &QueryParams,
        source: Option<&'static str>,
    ) -> ReconcileOutcome {
        match &outcome {
            ReconcileOutcome::Ok { token, rows_updated } => {
                tracing::info!(submission_id = %token, rows_updated, "Survey payload reconciled");
            }
            ReconcileOutcome::InternalError { token, detail, .. } => {
                tracing::error!(submission_id = %token, "Webhook store failure: {detail}");
            }
            other => {
                tracing::warn!(outcome = other.label(), "Webhook rejected");
            }
        }

        let delivery = WebhookDelivery {
            received_at: Utc::now(),
            raw_body: String::from_utf8_lossy(raw_body).into_owned(),
            payload,
            query_params: query.clone(),
            submission_id: outcome.token().map(|t| t.to_string()),
            source: source.map(str::to_string),
            outcome: outcome.label().to_string(),
            status_code: outcome.status().as_u16(),
            detail: outcome.detail(),
        };
        self.sink.record(&delivery).await;

        outcome
    }

    async fn resolve_and_store(
        &self,
        raw_body: &[u8],
        payload: Option<&Value>,
        query: &QueryParams,
    ) -> (ReconcileOutcome, Option<&'static str>) {
        let Some(payload) = payload else {
            return (
                ReconcileOutcome::InvalidPayload {
                    raw_body: String::from_utf8_lossy(raw_body).into_owned(),
                    query: query.clone(),
                },
                None,
            );
        };

        let Some(found) = correlation::extract_token(payload, query) else {
            return (
                ReconcileOutcome::MissingToken {
                    payload: payload.clone(),
                    query: query.clone(),
                },
                None,
            );
        };
        let source = Some(found.source);
        let token = found.token;

        match self.store.find(&token).await {
            Ok(Some(_)) => {}
            Ok(None) => return (ReconcileOutcome::NotFound { token }, source),
            Err(e) => {
                return (
                    ReconcileOutcome::InternalError {
                        token,
                        error: "database lookup failed",
                        detail: e.to_string(),
                    },
                    source,
                );
            }
        }

        let outcome = match self.store.update_secondary(&token, payload).await {
            // Deleted between lookup and update.
            Ok(0) => ReconcileOutcome::NotFound { token },
            Ok(rows_updated) => ReconcileOutcome::Ok {
                token,
                rows_updated,
            },
            Err(e) => ReconcileOutcome::InternalError {
                token,
                error: "database update failed",
                detail: e.to_string(),
            },
        };
        (outcome, source)
    }
}

/// Only a JSON object is accepted as a survey payload.
fn parse_payload(raw_body: &[u8]) -> Option<Value> {
    if raw_body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(raw_body) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}
