//! `Authorization` header extraction and Basic credential decoding.
//!
//! Header format: `Basic <base64(percent-encoded username ":" secret)>`.
//! The decoded payload is split on the first colon only, so a secret may
//! itself contain colons.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const BASIC_PREFIX: &str = "Basic ";

/// Decoded `(username, secret)` pair. Lives for one authorization check.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

// Keep the secret out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed credential: {0}")]
    Malformed(&'static str),
}

/// Find the `authorization` header, comparing names case-insensitively.
///
/// Headers are scanned in the order they were received and the first match
/// wins, even if its value is empty. An empty value is treated the same as a
/// missing header.
pub fn extract_authorization(headers: &[(String, String)]) -> Option<&str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// Parse a raw `Authorization` header value into a [`Credential`].
pub fn decode_basic(header: &str) -> Result<Credential, CredentialError> {
    let encoded = header
        .strip_prefix(BASIC_PREFIX)
        .ok_or(CredentialError::Malformed("expected Basic scheme"))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| CredentialError::Malformed("invalid base64 payload"))?;

    let payload =
        String::from_utf8(bytes).map_err(|_| CredentialError::Malformed("payload is not utf-8"))?;

    // No colon: the whole payload is the username and the secret is empty.
    let (username_part, secret) = payload.split_once(':').unwrap_or((payload.as_str(), ""));

    Ok(Credential {
        username: percent_decode(username_part)?,
        secret: secret.to_string(),
    })
}

/// Build a header value the way clients are expected to.
pub fn encode_basic(username: &str, secret: &str) -> String {
    let payload = format!("{}:{}", urlencoding::encode(username), secret);
    format!("{}{}", BASIC_PREFIX, STANDARD.encode(payload))
}

fn percent_decode(raw: &str) -> Result<String, CredentialError> {
    // urlencoding passes stray `%` through untouched; reject them instead.
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(CredentialError::Malformed("invalid percent escape"));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| CredentialError::Malformed("username is not utf-8"))
}
