use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::intake::parser::{self, RawForm};
use crate::intake::{FormSubmission, IntakeOutcome};
use crate::state::SharedState;

pub async fn intake(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    let raw = parser::parse_request(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let submission = match raw {
        RawForm::Json(value) => FormSubmission::from_json(&value),
        RawForm::Pairs(pairs) => FormSubmission::from_pairs(pairs),
    }
    .map_err(AppError::BadRequest)?;

    let outcome = match state.intake.handle(&submission).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(form = %submission.form_name, "Failed to store submission: {e}");
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to store submission" })),
            )
                .into_response());
        }
    };

    match outcome {
        IntakeOutcome::Ignored => {
            Ok((StatusCode::OK, Json(json!({ "status": "ignored" }))).into_response())
        }
        IntakeOutcome::Created {
            token,
            redirect_url,
        } => {
            // Browser form posts follow the redirect directly
            if content_type.is_some_and(|ct| ct.contains("form")) {
                return Ok(Redirect::to(&redirect_url).into_response());
            }

            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "submission_id": token,
                    "redirect_url": redirect_url,
                })),
            )
                .into_response())
        }
    }
}
