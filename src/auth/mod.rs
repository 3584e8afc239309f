/*!
 * # Authentication and Authorization Module
 *
 * JWT bearer authentication for staff clients. Tokens are minted by the
 * identity service; this module validates them, turns their claims into an
 * [`AuthUser`], and enforces `resource:action` permissions via router-level
 * middleware. Token issuance is kept only for local development and the test
 * suite.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ErrorResponse;

pub mod permissions;

pub use permissions::consts as permission;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (staff user ID)
    pub name: String,             // Display name, shown on printed tickets
    pub roles: Vec<String>,       // Staff roles (waiter, kitchen, manager, admin)
    pub permissions: Vec<String>, // Flattened permission strings
    pub jti: String,              // JWT ID
    pub iat: i64,                 // Issued at time
    pub exp: i64,                 // Expiration time
    pub nbf: i64,                 // Not valid before time
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
}

/// Authenticated staff member extracted from a validated token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub waiter_id: i64,
    pub name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the user has a specific permission, honoring wildcards.
    pub fn has_permission(&self, required: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permissions::is_permission_implied(granted, required))
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // auth_middleware has already validated the token and stashed the user.
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            token_expiration,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_audience: "comanda-api".to_string(),
            jwt_issuer: "comanda-auth".to_string(),
            token_expiration: Duration::from_secs(config.jwt_expiration.max(0) as u64),
        }
    }
}

/// Issued token response, used by the dev token endpoint and tests.
#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT token for a staff member.
    pub fn issue_token(
        &self,
        waiter_id: i64,
        name: &str,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: waiter_id.to_string(),
            name: name.to_string(),
            roles,
            permissions,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.clone()]);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Validate a raw token and build the authenticated user from its claims.
    ///
    /// Shared by the HTTP middleware and the websocket handshake, which reads
    /// the token from a query parameter instead of a header.
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validate_token(token)?;
        let waiter_id = claims.sub.parse::<i64>().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            waiter_id,
            name: claims.name,
            roles: claims.roles,
            permissions: claims.permissions,
            token_id: claims.jti,
        })
    }
}

/// Pull a bearer token out of the `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("No authentication token provided")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::MissingToken | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Authentication middleware that extracts and validates auth tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_owned(),
        None => return AuthError::MissingToken.into_response(),
    };

    match auth_service.authenticate(&token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    // Admins pass every permission check.
    if user.is_admin() {
        return Ok(next.run(request).await);
    }

    if !user.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "test-secret-key-that-is-long-enough!".to_string(),
            "comanda-api".to_string(),
            "comanda-auth".to_string(),
            Duration::from_secs(3600),
        ))
    }

    #[test]
    fn issued_tokens_validate_round_trip() {
        let service = test_service();
        let token = service
            .issue_token(
                7,
                "Ana",
                vec!["waiter".to_string()],
                vec![permission::ORDERS_CREATE.to_string()],
            )
            .unwrap();

        let user = service.authenticate(&token.access_token).unwrap();
        assert_eq!(user.waiter_id, 7);
        assert_eq!(user.name, "Ana");
        assert!(user.has_permission(permission::ORDERS_CREATE));
        assert!(!user.has_permission(permission::ORDERS_UPDATE));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let service = test_service();
        let other = AuthService::new(AuthConfig::new(
            "a-completely-different-signing-secret".to_string(),
            "comanda-api".to_string(),
            "comanda-auth".to_string(),
            Duration::from_secs(3600),
        ));

        let token = other.issue_token(7, "Ana", vec![], vec![]).unwrap();
        assert!(matches!(
            service.authenticate(&token.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let service = test_service();
        let other = AuthService::new(AuthConfig::new(
            "test-secret-key-that-is-long-enough!".to_string(),
            "some-other-api".to_string(),
            "comanda-auth".to_string(),
            Duration::from_secs(3600),
        ));

        let token = other.issue_token(7, "Ana", vec![], vec![]).unwrap();
        assert!(service.authenticate(&token.access_token).is_err());
    }

    #[test]
    fn admin_role_implies_nothing_without_middleware_but_wildcard_does() {
        let service = test_service();
        let token = service
            .issue_token(1, "Maria", vec!["manager".to_string()], vec!["admin:*".to_string()])
            .unwrap();

        let user = service.authenticate(&token.access_token).unwrap();
        assert!(user.has_permission(permission::ORDERS_UPDATE));
        assert!(user.has_permission(permission::MENU_READ));
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
