//! Authentication middleware for JWT access tokens
//!
//! The access token is read from the `accessToken` cookie, falling back to an
//! `Authorization: Bearer` header for non-cookie clients.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::revoked_token_key,
    state::AppState,
};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Raw access token, kept so logout can revoke it
    pub token: String,
}

/// Access token from the cookie jar or the Authorization header
pub fn extract_access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn authenticate(state: &AppState, token: String) -> ApiResult<AuthUser> {
    let claims = state.jwt_service.validate_access_token(&token).map_err(|e| {
        warn!("Rejected access token: {}", e);
        ApiError::Unauthorized("Invalid access token".to_string())
    })?;

    let revoked = state
        .redis_pool
        .is_marked(&revoked_token_key(&token))
        .await
        .map_err(|e| ApiError::internal("Failed to check token revocation", e))?;

    if revoked {
        return Err(ApiError::Unauthorized(
            "Access token has been revoked".to_string(),
        ));
    }

    let exists = state
        .user_repository
        .exists(claims.sub)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?;

    if !exists {
        return Err(ApiError::Unauthorized("Invalid access token".to_string()));
    }

    Ok(AuthUser {
        id: claims.sub,
        username: claims.username,
        email: claims.email,
        token,
    })
}

/// Require a valid access token; the user is stored in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_access_token(&jar, req.headers()).ok_or_else(ApiError::unauthorized)?;

    let user = authenticate(&state, token).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attach the user when a valid token is presented, continue anonymously otherwise
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_access_token(&jar, req.headers()) {
        match authenticate(&state, token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => warn!("Continuing anonymously: {}", e),
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_cookie_wins_over_header() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_access_token(&jar, &headers).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );

        assert_eq!(
            extract_access_token(&CookieJar::new(), &headers).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_missing_or_malformed_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_access_token(&CookieJar::new(), &headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_access_token(&CookieJar::new(), &headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_access_token(&CookieJar::new(), &headers), None);
    }
}
