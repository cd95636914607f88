//! Bearer-token authentication for the admin routes.
//!
//! Tokens are verified per request; the server keeps no session state.

pub mod claims;
pub mod jwt;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

pub use claims::{ADMIN_ROLE, Claims};
pub use jwt::JwtManager;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Admin role required")]
    Forbidden,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the request's bearer token and require the admin role.
pub fn authorize_admin(jwt: &JwtManager, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let claims = jwt.validate(token).map_err(|_| AuthError::InvalidToken)?;
    if !claims.is_admin() {
        return Err(AuthError::Forbidden);
    }
    Ok(claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn test_jwt() -> JwtManager {
        JwtManager::new(b"test-secret", 3600)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn valid_admin_token_passes() {
        let jwt = test_jwt();
        let (token, _) = jwt.issue_token("ops", ADMIN_ROLE).unwrap();

        let claims = authorize_admin(&jwt, &headers_with(&format!("Bearer {token}"))).unwrap();
        assert_eq!(claims.sub, "ops");
    }

    #[test]
    fn missing_header_fails() {
        let err = authorize_admin(&test_jwt(), &HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[test]
    fn non_bearer_scheme_fails() {
        let err = authorize_admin(&test_jwt(), &headers_with("Basic dXNlcjpwYXNz")).unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[test]
    fn garbage_token_fails() {
        let err = authorize_admin(&test_jwt(), &headers_with("Bearer nope")).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn non_admin_role_is_forbidden() {
        let jwt = test_jwt();
        let (token, _) = jwt.issue_token("viewer", "viewer").unwrap();
        let err = authorize_admin(&jwt, &headers_with(&format!("Bearer {token}"))).unwrap_err();
        assert_eq!(err, AuthError::Forbidden);
    }
}
