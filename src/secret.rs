//! Salted update secret hashes.
//!
//! Hashes are stored as `sha256$<salt>$<digest>`, where both `salt` and `digest` are standard
//! BASE64 and `digest` is the SHA-256 of the salt bytes followed by the secret.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const ALGORITHM: &str = "sha256";
const SALT_LEN_BYTES: usize = 16;

/// Hash `secret` with a fresh random salt, producing a value suitable for a host's
/// `update_secret` configuration entry.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    let mut salt = [0u8; SALT_LEN_BYTES];
    OsRng.fill_bytes(&mut salt);
    hash_with_salt(secret, &salt)
}

fn hash_with_salt(secret: &str, salt: &[u8]) -> String {
    format!(
        "{ALGORITHM}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(digest(salt, secret))
    )
}

fn digest(salt: &[u8], secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

/// Check `secret` against a stored hash. Malformed hashes, and hashes using an unknown
/// algorithm, never verify.
#[must_use]
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(ALGORITHM), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
        return false;
    };

    let actual = digest(&salt, secret);
    if actual.len() != expected.len() {
        return false;
    }
    actual.ct_eq(&expected).into()
}
