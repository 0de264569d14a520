// Session token generation and hashing

use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use std::fmt;

const TOKEN_BYTES: usize = 32;

/// SHA-256 hash of a session token (64-character hex string)
///
/// Only the hash is persisted; the raw token lives in the client cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTokenHash(String);

impl SessionTokenHash {
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an existing hash string (64 hex characters), e.g. a database column
    pub fn from_hash_string(hash_str: &str) -> Result<Self, String> {
        if hash_str.len() != 64 {
            return Err(format!("Invalid hash length: expected 64, got {}", hash_str.len()));
        }
        if !hash_str.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Invalid hash format: must be 64 hex characters".to_string());
        }
        Ok(Self(hash_str.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw session token as carried by the `session_id` cookie
pub struct SessionToken(Secret<String>);

impl SessionToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Secret::new(hex::encode(bytes)))
    }

    pub fn new(token: &str) -> Self {
        Self(Secret::new(token.to_string()))
    }

    pub fn hash(&self) -> SessionTokenHash {
        SessionTokenHash::from_token(self.expose_secret())
    }

    /// Expose the raw token (cookie value only)
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<REDACTED>")
    }
}
