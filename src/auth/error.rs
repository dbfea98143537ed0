//! Error taxonomy for the authentication layer.
//!
//! Every failure inside `crate::auth` is an [`AuthError`]. Callers never match on
//! individual variants to build a response; they ask for the [`ErrorKind`] and map
//! that to an HTTP status, so the client only ever learns the class of failure.

use thiserror::Error;

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // ---
    /// Deployment problem. 500, details logged server-side only.
    Misconfiguration,

    /// Credential, token or signature rejected. Uniform 401.
    Unauthorized,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // ---
    #[error("missing secret: {0}")]
    MissingSecret(&'static str),

    #[error("admin passphrase hash is not configured")]
    MissingPassphraseHash,

    #[error("admin cookie domain is not configured")]
    MissingCookieDomain,

    #[error("unsupported passphrase hash format")]
    UnsupportedHashFormat,

    #[error("invalid scrypt parameters: {0}")]
    InvalidScryptParams(&'static str),

    #[error("invalid base64url encoding")]
    InvalidEncoding,

    #[error("malformed session token")]
    MalformedToken,

    #[error("session token signature mismatch")]
    BadSignature,

    #[error("session token role mismatch")]
    RoleMismatch,

    #[error("session token expired")]
    Expired,

    #[error("session token bound to a different client")]
    FingerprintMismatch,

    #[error("session cookie missing")]
    MissingCookie,

    #[error("initData hash missing")]
    MissingHash,

    #[error("initData hash mismatch")]
    InvalidHash,

    #[error("initData user missing or invalid")]
    InvalidUser,
}

impl AuthError {
    // ---
    pub fn kind(&self) -> ErrorKind {
        // ---
        match self {
            AuthError::MissingSecret(_)
            | AuthError::MissingPassphraseHash
            | AuthError::MissingCookieDomain
            | AuthError::UnsupportedHashFormat
            | AuthError::InvalidScryptParams(_) => ErrorKind::Misconfiguration,

            AuthError::InvalidEncoding
            | AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::RoleMismatch
            | AuthError::Expired
            | AuthError::FingerprintMismatch
            | AuthError::MissingCookie
            | AuthError::MissingHash
            | AuthError::InvalidHash
            | AuthError::InvalidUser => ErrorKind::Unauthorized,
        }
    }

    pub fn is_misconfiguration(&self) -> bool {
        // ---
        self.kind() == ErrorKind::Misconfiguration
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
