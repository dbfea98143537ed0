//! HMAC-SHA256 keyed with a process-wide secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

use super::compare::constant_time_eq;
use super::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies messages with one secret.
///
/// The signer may be built without a secret. Every operation then fails with
/// [`AuthError::MissingSecret`] naming the configuration key, so a missing secret
/// surfaces as a server error on first use instead of a silent bypass.
#[derive(Clone)]
pub struct HmacSigner {
    // ---
    secret: Option<Arc<[u8]>>,
    name: &'static str,
}

impl HmacSigner {
    // ---
    pub fn new(secret: Option<&str>, name: &'static str) -> Self {
        // ---
        let secret = secret
            .filter(|s| !s.is_empty())
            .map(|s| Arc::from(s.as_bytes()));
        Self { secret, name }
    }

    pub fn is_configured(&self) -> bool {
        // ---
        self.secret.is_some()
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        // ---
        let secret = self
            .secret
            .as_deref()
            .ok_or(AuthError::MissingSecret(self.name))?;

        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(secret).map_err(|_| AuthError::MissingSecret(self.name))
    }

    /// Raw 32-byte HMAC-SHA256 of `message`.
    pub fn sign(&self, message: &[u8]) -> AuthResult<[u8; 32]> {
        // ---
        let mut mac = self.mac()?;
        mac.update(message);

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        Ok(digest)
    }

    /// Lowercase hex digest of `message`.
    pub fn sign_hex(&self, message: &[u8]) -> AuthResult<String> {
        // ---
        Ok(hex::encode(self.sign(message)?))
    }

    pub fn verify(&self, message: &[u8], expected: &[u8]) -> AuthResult<bool> {
        // ---
        let actual = self.sign(message)?;
        Ok(constant_time_eq(&actual, expected))
    }
}

impl fmt::Debug for HmacSigner {
    // ---
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("name", &self.name)
            .field("configured", &self.is_configured())
            .finish()
    }
}
