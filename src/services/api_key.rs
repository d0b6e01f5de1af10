//! API key generation for provisioned users.
use thiserror::Error;

const KEY_PREFIX: &str = "sk_live_";
const KEY_LEN: usize = 24;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
#[error("random source unavailable: {0}")]
pub struct ApiKeyError(String);

/// `sk_live_` followed by 24 random alphanumerics.
pub fn generate_api_key() -> Result<String, ApiKeyError> {
    let mut key = String::with_capacity(KEY_PREFIX.len() + KEY_LEN);
    key.push_str(KEY_PREFIX);

    // Rejection sampling keeps the distribution uniform over the 62 symbols.
    let limit = (u8::MAX as usize + 1) / ALPHABET.len() * ALPHABET.len();
    let mut buf = [0u8; 64];
    while key.len() < KEY_PREFIX.len() + KEY_LEN {
        getrandom::fill(&mut buf).map_err(|e| ApiKeyError(e.to_string()))?;
        for &b in buf.iter().filter(|&&b| (b as usize) < limit) {
            if key.len() == KEY_PREFIX.len() + KEY_LEN {
                break;
            }
            key.push(ALPHABET[b as usize % ALPHABET.len()] as char);
        }
    }

    Ok(key)
}
