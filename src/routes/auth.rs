use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{encode_token, Claims};
use crate::auth::verify_admin;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn session_cookie(access_token: &str) -> Cookie<'static> {
    Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    if state.config.admin.password_hash.is_none() {
        return Err(AppError::Forbidden("Admin login is disabled".to_string()));
    }

    if state.login_limiter.check(&req.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let valid = verify_admin(&state.config.admin, &req.username, &req.password)
        .map_err(AppError::Internal)?;

    if !valid {
        // Only the configured account is tracked.
        if req.username.eq_ignore_ascii_case(&state.config.admin.username) {
            state.login_limiter.record_failure(&req.username);
        }
        tracing::warn!(username = %req.username, "Failed admin login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    state.login_limiter.reset(&req.username);

    let claims = Claims::new(&state.config.admin.username);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    tracing::info!(username = %claims.sub, "Admin logged in");

    Ok((
        jar.add(session_cookie(&access_token)),
        Json(LoginResponse {
            access_token,
            csrf_token: claims.csrf,
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let removal = Cookie::build(("access_token", "")).path("/").build();
    (
        jar.remove(removal),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}
