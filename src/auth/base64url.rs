//! Unpadded URL-safe base64, as used for session token segments.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use super::error::{AuthError, AuthResult};

/// Encodes bytes as URL-safe base64 without trailing `=`.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    // ---
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes a URL-safe segment.
///
/// The segment is mapped back to the standard alphabet and re-padded to a multiple
/// of four before decoding. Anything that still fails is [`AuthError::InvalidEncoding`].
pub fn decode(segment: &str) -> AuthResult<Vec<u8>> {
    // ---
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let pad = (4 - normalized.len() % 4) % 4;
    normalized.extend(std::iter::repeat('=').take(pad));

    STANDARD
        .decode(normalized.as_bytes())
        .map_err(|_| AuthError::InvalidEncoding)
}
