pub mod auth;
pub mod config;
pub mod correlation;
pub mod db;
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod intake;
pub mod models;
pub mod rate_limit;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;
pub mod token;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::intake::IntakeHandler;
use crate::rate_limit::LoginRateLimiter;
use crate::reconcile::WebhookReconciler;
use crate::state::{AppState, SharedState};
use crate::store::SubmissionStore;

/// Wire the service around an already-chosen store and diagnostic sink.
pub fn build_app(
    config: Config,
    store: Arc<dyn SubmissionStore>,
    sink: Arc<dyn DiagnosticSink>,
) -> Router {
    let intake = IntakeHandler::new(
        store.clone(),
        config.target_form.clone(),
        config.survey_url.clone(),
    );
    let reconciler = WebhookReconciler::new(store.clone(), sink);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        config,
        store,
        intake,
        reconciler,
        login_limiter: LoginRateLimiter::new(),
    });

    let bounded = Router::new()
        .merge(routes::api_routes())
        .merge(routes::intake_routes())
        .layer(RequestBodyLimitLayer::new(max_body_size));

    // Webhooks enforce the limit while extracting, so oversized deliveries
    // still get a JSON answer and a diagnostic record.
    let webhooks = routes::webhook_routes().layer(DefaultBodyLimit::max(max_body_size));

    Router::new()
        .merge(bounded)
        .merge(webhooks)
        .route("/health", axum::routing::get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
