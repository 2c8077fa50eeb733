//! Bearer-token authentication.
//!
//! Token issuance belongs to the external identity provider; this module
//! only resolves an opaque token to a verified user id and loads the user's
//! role for the admin gate. Handlers receive the user id as an explicit
//! extractor value, never through ambient request state.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::domain::models::Role;
use crate::error::ApiError;
use crate::rest::AppState;
use crate::storage::TokenRepository;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an opaque bearer token to a user id, None when unknown.
    async fn verify(&self, token: &str) -> Result<Option<String>>;
}

/// Verification against the auth_tokens table.
pub struct StoreTokenIdentity {
    tokens: TokenRepository,
}

impl StoreTokenIdentity {
    pub fn new(tokens: TokenRepository) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityProvider for StoreTokenIdentity {
    async fn verify(&self, token: &str) -> Result<Option<String>> {
        self.tokens.find_user_id(token).await
    }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let user_id = state
            .identity
            .verify(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        // The token may outlive the account; a missing user is still a 401.
        let user = state
            .users
            .find(&user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::User;
    use crate::domain::Clock;
    use crate::test_support::{wib_time, TestBackend};
    use axum::http::Request;

    fn parts_with_auth(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/checkin/summary");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn seed_user(backend: &TestBackend, role: Role, token: &str) -> String {
        let user = User::new("Test", role, backend.clock.now_utc());
        backend.users.insert(&user).await.unwrap();
        backend
            .tokens
            .insert(token, &user.id, backend.clock.now_utc())
            .await
            .unwrap();
        user.id
    }

    #[tokio::test]
    async fn resolves_a_known_bearer_token() {
        let backend = TestBackend::at(wib_time(2024, 3, 15, 9, 0)).await;
        let state = backend.state();
        let user_id = seed_user(&backend, Role::User, "tok-1").await;

        let mut parts = parts_with_auth(Some("Bearer tok-1"));
        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn missing_or_malformed_headers_are_unauthorized() {
        let backend = TestBackend::at(wib_time(2024, 3, 15, 9, 0)).await;
        let state = backend.state();
        seed_user(&backend, Role::User, "tok-1").await;

        for header in [None, Some("tok-1"), Some("Basic tok-1"), Some("Bearer nope")] {
            let mut parts = parts_with_auth(header);
            let err = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized));
        }
    }

    #[tokio::test]
    async fn admin_gate_checks_the_role() {
        let backend = TestBackend::at(wib_time(2024, 3, 15, 9, 0)).await;
        let state = backend.state();
        seed_user(&backend, Role::User, "tok-user").await;
        seed_user(&backend, Role::Admin, "tok-admin").await;

        let mut parts = parts_with_auth(Some("Bearer tok-user"));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let mut parts = parts_with_auth(Some("Bearer tok-admin"));
        let admin = AdminUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(admin.0.role, Role::Admin);
    }
}
