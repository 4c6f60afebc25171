//! Caller identity extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use http::header::AUTHORIZATION;
use http::request::Parts;

use bookstore_domain::actor::Actor;

use crate::cookie::BOOKSTORE_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// HMAC secret used to validate access tokens. Provide it from the router state via `FromRef`.
#[derive(Clone)]
pub struct TokenSecret(pub Arc<str>);

impl TokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The actor behind a request.
///
/// Reads `Authorization: Bearer <token>` first, then the access-token cookie. A missing,
/// expired or otherwise invalid token yields [`Actor::Anonymous`]; this extractor never
/// rejects. Handlers decide what anonymous callers may do.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(BOOKSTORE_ACCESS_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

fn actor_from_parts(parts: &Parts, secret: &TokenSecret) -> Actor {
    let Some(token) = bearer_token(parts).or_else(|| cookie_token(parts)) else {
        return Actor::Anonymous;
    };
    match validate_access_token(&token, secret.as_str()) {
        Ok(info) => Actor::User(info.identity),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid access token");
            Actor::Anonymous
        }
    }
}

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
    TokenSecret: FromRef<S>,
{
    type Rejection = Infallible;

    // Resolve synchronously and hand back a 'static future; `async fn` here trips E0195
    // against axum-core's `impl Future + Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = TokenSecret::from_ref(state);
        let actor = actor_from_parts(parts, &secret);
        async move { Ok(Self(actor)) }
    }
}
