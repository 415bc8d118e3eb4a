use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AuthConfig;

/// Name of the cookie that carries the JWT.
pub const TOKEN_COOKIE: &str = "token";

/// Build the HTTP-only cookie holding a freshly issued token.
pub fn token_cookie(token: String, auth: &AuthConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(auth.token_ttl_days))
        .build()
}

/// Build the cookie that clears the token on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, "")).path("/").build()
}
