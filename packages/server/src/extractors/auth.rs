use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use common::Role;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookie::TOKEN_COOKIE;
use crate::utils::jwt;

/// Authenticated user extracted from the `token` cookie, or from an
/// `Authorization: Bearer <token>` header when no cookie is sent.
///
/// Add this as a handler parameter to require authentication. Ownership and
/// membership checks happen in the handler body (see `utils::access`).
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Returns `Ok(())` if the user holds the `ADMIN` role.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<Result<String, AppError>> {
    let header = parts.headers.get("Authorization")?;
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or(AppError::TokenInvalid);
    Some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = match jar.get(TOKEN_COOKIE).map(|c| c.value().to_owned()) {
            Some(token) if !token.is_empty() => token,
            _ => bearer_token(parts).ok_or(AppError::TokenMissing)??,
        };

        let claims =
            jwt::verify(&token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
