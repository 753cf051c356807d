pub mod auth;
pub mod intake;
pub mod submissions;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Submissions
        .route("/api/v1/submissions", get(submissions::list))
        .route(
            "/api/v1/submissions/{token}",
            get(submissions::get).delete(submissions::delete),
        )
}

pub fn intake_routes() -> Router<SharedState> {
    Router::new().route("/efc/v1/intake", post(intake::intake))
}

pub fn webhook_routes() -> Router<SharedState> {
    Router::new()
        .route("/efc/v1/funnelform-webhook", post(webhook::funnelform_webhook))
        .route(
            "/wp-json/efc/v1/funnelform-webhook",
            post(webhook::funnelform_webhook),
        )
}
