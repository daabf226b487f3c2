//! Password Hashing
//!
//! Argon2id hashing with a fresh random salt per call. Verification is
//! constant-time via the argon2 crate's verifier.

use crate::config::AuthConfig;
use crate::error::AuthError;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier,
        SaltString},
    Argon2, Params,
};

/// Password hasher with fixed cost parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|_| AuthError::Internal)?;

        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }

    /// Hash a password with a per-call random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored hash
    ///
    /// A mismatch returns `Ok(false)`; only a malformed stored hash or a
    /// hasher failure is an error.
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|err| {
            tracing::error!("Malformed stored password hash: {:?}", err);
            AuthError::Internal
        })?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&test_config()).unwrap()
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = hasher();
        let hash = hasher.hash("hunter2!").unwrap();
        assert!(hasher.verify("hunter2!", &hash).unwrap());
    }

    #[test]
    fn mismatch_is_false_not_error() {
        let hasher = hasher();
        let hash = hasher.hash("hunter2!").unwrap();
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = hasher();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_is_error() {
        let hasher = hasher();
        assert_eq!(
            hasher.verify("anything", "not-a-phc-string").unwrap_err(),
            AuthError::Internal
        );
    }
}
