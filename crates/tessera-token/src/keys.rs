//! Process-wide HMAC signing key.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use std::fmt;

/// Key length in bytes, the SHA-256 block size.
pub const KEY_LEN: usize = 64;

/// Symmetric key for HS256 session tokens.
///
/// Generated once at startup. There is intentionally no way to read the key
/// material back out, and `Debug` never prints it.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self::from_secret(&bytes)
    }

    /// Build a key from existing secret bytes.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}
