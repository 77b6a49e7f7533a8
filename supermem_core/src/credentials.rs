//! Password hashing for learner accounts

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use crate::error::{Error, Result};

const SALT_SIZE: usize = 16;

/// One-way salted password hashing.
pub trait Credentials {
    /// Hash `password` into an opaque single-line string.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check `password` against a string produced by [`Credentials::hash`].
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default parameters, stored as PHC strings
#[derive(Default)]
pub struct Argon2Credentials {
    argon2: Argon2<'static>,
}

impl Argon2Credentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Credentials for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| Error::Hash(e.to_string()))?;
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::warn!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }
}
