//! Admin passphrase verification.
//!
//! The configured hash is parsed once into a [`StoredHash`] and every login
//! dispatches on that tag. Two encodings are accepted:
//!
//! - `$argon2id$v=19$m=...` PHC strings, verified by the `argon2` crate.
//! - `scrypt$N$r$p$<base64 salt>$<base64 key>`, re-derived with the stored
//!   parameters and compared in constant time.
//!
//! Anything else is a deployment error, reported as such on every attempt rather
//! than being folded into "wrong passphrase".

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::str::FromStr;
use std::sync::Arc;

use super::compare::constant_time_eq;
use super::error::{AuthError, AuthResult};

/// Standard alphabet, padding optional, like most scrypt hash generators emit.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone)]
pub struct ScryptHash {
    // ---
    params: scrypt::Params,
    salt: Vec<u8>,
    key: Vec<u8>,
}

/// A parsed admin passphrase hash.
#[derive(Debug, Clone)]
pub enum StoredHash {
    // ---
    /// Self-describing PHC string, kept verbatim.
    Argon2(String),
    Scrypt(ScryptHash),
}

impl FromStr for StoredHash {
    // ---
    type Err = AuthError;

    fn from_str(encoded: &str) -> AuthResult<Self> {
        // ---
        if encoded.starts_with("$argon2") {
            PasswordHash::new(encoded).map_err(|_| AuthError::UnsupportedHashFormat)?;
            return Ok(StoredHash::Argon2(encoded.to_string()));
        }

        if encoded.starts_with("scrypt$") {
            return parse_scrypt(encoded).map(StoredHash::Scrypt);
        }

        Err(AuthError::UnsupportedHashFormat)
    }
}

fn parse_scrypt(encoded: &str) -> AuthResult<ScryptHash> {
    // ---
    let fields: Vec<&str> = encoded.split('$').collect();
    let [_, n, r, p, salt, key] = fields.as_slice() else {
        return Err(AuthError::UnsupportedHashFormat);
    };

    let n: u64 = n.parse().map_err(|_| AuthError::InvalidScryptParams("N"))?;
    let r: u32 = r.parse().map_err(|_| AuthError::InvalidScryptParams("r"))?;
    let p: u32 = p.parse().map_err(|_| AuthError::InvalidScryptParams("p"))?;

    // scrypt cost must be a power of two greater than one
    if n < 2 || !n.is_power_of_two() {
        return Err(AuthError::InvalidScryptParams("N"));
    }
    let log_n = n.trailing_zeros() as u8;

    let params = scrypt::Params::new(log_n, r, p, scrypt::Params::RECOMMENDED_LEN)
        .map_err(|_| AuthError::InvalidScryptParams("N/r/p"))?;

    let salt = LENIENT_BASE64
        .decode(salt)
        .map_err(|_| AuthError::InvalidScryptParams("salt"))?;
    let key = LENIENT_BASE64
        .decode(key)
        .map_err(|_| AuthError::InvalidScryptParams("key"))?;

    if key.is_empty() {
        return Err(AuthError::InvalidScryptParams("key"));
    }

    Ok(ScryptHash { params, salt, key })
}

impl StoredHash {
    // ---
    /// Checks `passphrase` against this hash.
    ///
    /// `Ok(false)` means the passphrase is wrong; `Err` means the hash itself
    /// cannot be used.
    pub fn verify(&self, passphrase: &str) -> AuthResult<bool> {
        // ---
        match self {
            StoredHash::Argon2(encoded) => verify_argon2(encoded, passphrase),
            StoredHash::Scrypt(hash) => verify_scrypt(hash, passphrase),
        }
    }
}

fn verify_argon2(encoded: &str, passphrase: &str) -> AuthResult<bool> {
    // ---
    let parsed = PasswordHash::new(encoded).map_err(|_| AuthError::UnsupportedHashFormat)?;

    match Argon2::default().verify_password(passphrase.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => {
            tracing::error!("argon2 verification could not run: {}", err);
            Err(AuthError::UnsupportedHashFormat)
        }
    }
}

fn verify_scrypt(hash: &ScryptHash, passphrase: &str) -> AuthResult<bool> {
    // ---
    let mut derived = vec![0u8; hash.key.len()];
    scrypt::scrypt(passphrase.as_bytes(), &hash.salt, &hash.params, &mut derived)
        .map_err(|_| AuthError::InvalidScryptParams("key length"))?;

    Ok(constant_time_eq(&derived, &hash.key))
}

/// Verifies submitted passphrases against the configured admin hash.
///
/// Construction never fails: a missing or unparseable hash is kept as the error
/// and returned from [`PassphraseVerifier::verify`], so the service still starts and
/// the login endpoint answers 500.
#[derive(Debug, Clone)]
pub struct PassphraseVerifier {
    // ---
    stored: Result<Arc<StoredHash>, AuthError>,
}

impl PassphraseVerifier {
    // ---
    pub fn from_config(encoded: Option<&str>) -> Self {
        // ---
        let stored = match encoded.filter(|s| !s.is_empty()) {
            None => Err(AuthError::MissingPassphraseHash),
            Some(encoded) => encoded.parse::<StoredHash>().map(Arc::new),
        };

        if let Err(err) = &stored {
            tracing::warn!("Admin passphrase hash unusable: {}", err);
        }

        Self { stored }
    }

    pub fn verify(&self, passphrase: &str) -> AuthResult<bool> {
        // ---
        let stored = self.stored.as_ref().map_err(Clone::clone)?;
        stored.verify(passphrase)
    }
}
