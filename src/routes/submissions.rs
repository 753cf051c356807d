use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::json;

use crate::auth::extractor::AdminUser;
use crate::display;
use crate::error::AppError;
use crate::models::Submission;
use crate::state::SharedState;
use crate::token::Token;

fn summary(submission: &Submission) -> serde_json::Value {
    let field = |id: &str| {
        submission
            .primary_payload
            .get(id)
            .map(|v| v.display())
            .unwrap_or_default()
    };

    json!({
        "submission_id": submission.token,
        "first_name": field("first_name"),
        "email": field("email"),
        "created_at": submission.created_at,
        "has_secondary": submission.secondary_payload.is_some(),
    })
}

fn parse_token(raw: &str) -> Result<Token, AppError> {
    Token::parse(raw).ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
}

pub async fn list(
    _admin: AdminUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let submissions = state.store.list().await?;
    let items: Vec<serde_json::Value> = submissions.iter().map(summary).collect();
    let total = items.len();

    Ok(Json(json!({
        "submissions": items,
        "total": total,
    })))
}

pub async fn get(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = parse_token(&token)?;
    let submission = state
        .store
        .find(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(json!({
        "primary_rows": display::primary_rows(&submission.primary_payload),
        "secondary_rows": display::secondary_rows(submission.secondary_payload.as_ref()),
        "submission": submission,
    })))
}

pub async fn delete(
    admin: AdminUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    admin.require_csrf(&headers)?;
    let token = parse_token(&token)?;

    if !state.store.delete(&token).await? {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }

    tracing::info!(admin = %admin.username, submission_id = %token, "Submission deleted");

    Ok(Json(json!({
        "deleted": true,
        "submission_id": token,
    })))
}
