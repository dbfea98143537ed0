//! Authentication and integrity verification.
//!
//! Leaf primitives (constant-time comparison, HMAC, base64url) compose into the
//! passphrase verifier, the session token codec and the Telegram `initData`
//! verifier. [`Authenticator`] bundles them behind the two contracts handlers use,
//! and [`require_manager`] / [`Manager`] gate privileged routes.

mod authenticator;
mod base64url;
mod compare;
mod cookie;
mod error;
mod middleware;
mod passphrase;
mod signer;
mod telegram;
mod token;

pub use authenticator::Authenticator;
pub use compare::constant_time_eq;
pub use cookie::{parse_cookie_header, SessionCookie, DEFAULT_COOKIE_NAME};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use middleware::{require_manager, Manager};
pub use passphrase::{PassphraseVerifier, StoredHash};
pub use signer::HmacSigner;
pub use telegram::{data_check_string, InitDataVerifier, TelegramUser};
pub use token::{SessionClaims, TokenCodec, MANAGER_ROLE};

/// Base64url codec used for token segments.
pub mod encoding {
    pub use super::base64url::{decode, encode};
}
