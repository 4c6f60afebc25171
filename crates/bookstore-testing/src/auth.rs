//! Mock auth helpers for router tests.
//!
//! `MockAuth` signs a real access token for an arbitrary identity so requests pass through
//! the same `CurrentActor` extractor production traffic does.

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use bookstore_auth_types::token::issue_access_token;
use bookstore_domain::actor::Identity;
use bookstore_domain::user::UserRole;

/// Secret shared by router tests and the state they build.
pub const TEST_JWT_SECRET: &str = "bookstore-test-secret";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub identity: Identity,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            identity: Identity::new(user_id, role),
        }
    }

    pub fn customer() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Customer)
    }

    pub fn staff() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Staff)
    }

    pub fn user_id(&self) -> Uuid {
        self.identity.user_id
    }

    /// A signed bearer token for this identity.
    pub fn token(&self) -> String {
        issue_access_token(self.identity, TEST_JWT_SECRET)
            .map(|(token, _)| token)
            .unwrap_or_else(|e| panic!("failed to sign test token: {e}"))
    }

    /// `Authorization` header carrying [`MockAuth::token`].
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .unwrap_or_else(|e| panic!("invalid header value: {e}"));
        (AUTHORIZATION, value)
    }
}
