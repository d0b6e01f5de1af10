use subtle::ConstantTimeEq;

use crate::repos::user_repo::{AccountRecord, StoredSecretKey};

/// True iff `candidate` equals the value of at least one enabled key.
///
/// Entries that cannot be decoded never match. An empty candidate never
/// matches either.
pub fn has_secret_key(record: &AccountRecord, candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }

    let Some(keys) = record.secret_keys.as_deref() else {
        return false;
    };

    keys.iter().any(|raw| match StoredSecretKey::decode(raw) {
        Ok(key) => !key.disabled && ct_eq(key.value.as_bytes(), candidate.as_bytes()),
        Err(err) => {
            tracing::warn!(username = %record.id, error = %err, "undecodable secret key entry");
            false
        }
    })
}

fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}
