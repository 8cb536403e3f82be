use crate::common::auth::JwtService;
use crate::common::{MemberId, Viewer};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Authenticated user information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub member_id: MemberId,
    pub is_admin: bool,
}

impl From<&AuthUser> for Viewer {
    fn from(user: &AuthUser) -> Self {
        Viewer::authenticated(user.member_id, user.is_admin)
    }
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = bearer_token(request.headers()).and_then(|t| verify(&jwt_service, t));

    if let Some(user) = auth_user {
        debug!(member_id = %user.member_id, is_admin = user.is_admin, "authenticated request");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Token from the Authorization header, with or without the `Bearer ` prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    Some(auth_str.strip_prefix("Bearer ").unwrap_or(auth_str))
}

/// Verify a raw token into an [`AuthUser`].
pub fn verify(jwt_service: &JwtService, token: &str) -> Option<AuthUser> {
    let claims = jwt_service.verify_token(token).ok()?;
    Some(AuthUser {
        member_id: MemberId::from_uuid(claims.member_id),
        is_admin: claims.is_admin,
    })
}

/// Handlers take a [`Viewer`]; anonymous when the middleware found no token.
#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthUser>()
            .map(Viewer::from)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn headers(value: String) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_token_with_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let member_id = Uuid::new_v4();
        let token = jwt_service.create_token(member_id, true).unwrap();

        let headers = headers(format!("Bearer {}", token));
        let auth_user = bearer_token(&headers).and_then(|t| verify(&jwt_service, t));
        let auth_user = auth_user.unwrap();
        assert_eq!(auth_user.member_id, MemberId::from_uuid(member_id));
        assert!(auth_user.is_admin);
    }

    #[test]
    fn test_extract_token_without_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let member_id = Uuid::new_v4();
        let token = jwt_service.create_token(member_id, false).unwrap();

        let headers = headers(token);
        let auth_user = bearer_token(&headers).and_then(|t| verify(&jwt_service, t));
        assert_eq!(auth_user.unwrap().member_id, MemberId::from_uuid(member_id));
    }

    #[test]
    fn test_no_auth_header() {
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_invalid_token() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let headers = headers("Bearer invalid_token".to_string());
        let auth_user = bearer_token(&headers).and_then(|t| verify(&jwt_service, t));
        assert!(auth_user.is_none());
    }
}
