use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use subtle::ConstantTimeEq;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
    csrf: String,
}

impl AdminUser {
    /// Anti-forgery check for state-changing admin requests.
    pub fn require_csrf(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let presented = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("Missing anti-forgery token".to_string()))?;

        if bool::from(presented.as_bytes().ct_eq(self.csrf.as_bytes())) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Invalid anti-forgery token".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = match parts.headers.get("authorization") {
            Some(value) => {
                let auth_str = value.to_str().map_err(|_| {
                    AppError::Unauthorized("Invalid authorization header".to_string())
                })?;
                auth_str.strip_prefix("Bearer ").map(str::to_string)
            }
            None => None,
        };

        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get("access_token")
                .map(|cookie| cookie.value().to_string())
                .ok_or_else(|| {
                    AppError::Unauthorized("Missing authentication token".to_string())
                })?,
        };

        let claims = jwt::decode_token(&token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if claims.sub != state.config.admin.username {
            return Err(AppError::Unauthorized("Unknown user".to_string()));
        }

        Ok(AdminUser {
            username: claims.sub,
            csrf: claims.csrf,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn admin() -> AdminUser {
        AdminUser {
            username: "admin".to_string(),
            csrf: "abc123".to_string(),
        }
    }

    #[test]
    fn csrf_header_must_match() {
        let mut headers = HeaderMap::new();
        assert!(matches!(admin().require_csrf(&headers), Err(AppError::Forbidden(_))));

        headers.insert(CSRF_HEADER, HeaderValue::from_static("wrong"));
        assert!(matches!(admin().require_csrf(&headers), Err(AppError::Forbidden(_))));

        headers.insert(CSRF_HEADER, HeaderValue::from_static("abc123"));
        assert!(admin().require_csrf(&headers).is_ok());
    }
}
