use anyhow::Context as _;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::domain::repository::CredentialPort;
use crate::error::ServiceError;

/// Argon2id with default parameters; credentials are PHC strings.
#[derive(Clone, Default)]
pub struct Argon2Credentials;

impl CredentialPort for Argon2Credentials {
    fn hash_and_store(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(anyhow::Error::msg)
            .context("hash password")?;
        Ok(hash.to_string())
    }

    fn verify(&self, credential: &str, password: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(credential)
            .map_err(anyhow::Error::msg)
            .context("parse stored credential")?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::Error::msg(e).context("verify password").into()),
        }
    }
}
