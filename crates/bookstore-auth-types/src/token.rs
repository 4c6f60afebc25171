//! JWT access tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_domain::actor::Identity;
use bookstore_domain::user::UserRole;

use crate::cookie::ACCESS_TOKEN_EXP;

/// Errors returned by [`validate_access_token`] and [`issue_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `sub` | `sub` | UUID string | user ID |
/// | `role` | custom | `u8` wire value | see [`UserRole`] |
/// | `exp` | `exp` | seconds since epoch | token expiration |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: u8,
    pub exp: u64,
}

/// Identity carried by a validated token.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub identity: Identity,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign an access token for `identity`, returning it with its expiry timestamp.
///
/// The role is frozen into the token; a role change takes effect at the next login.
pub fn issue_access_token(identity: Identity, secret: &str) -> Result<(String, u64), AuthError> {
    let exp = now_secs() + ACCESS_TOKEN_EXP;
    let claims = JwtClaims {
        sub: identity.user_id.to_string(),
        role: identity.role.as_u8(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)?;
    Ok((token, exp))
}

/// HS256, `exp` checked with the default 60s leeway, `exp` + `sub` required.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an access token, returning the identity it carries.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    let role = UserRole::from_u8(claims.role).ok_or(AuthError::Malformed)?;
    Ok(TokenInfo {
        identity: Identity::new(user_id, role),
        exp: claims.exp,
    })
}
