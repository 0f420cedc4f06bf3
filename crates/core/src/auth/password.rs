//! Salted password hashing.

use sha2::{Digest, Sha256};

/// Hash a password with a fresh random salt. Output is `salt$hexdigest`.
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = digest_with_salt(&salt, password);
    format!("{salt}${digest}")
}

/// Verify a password against a stored `salt$hexdigest` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let computed = digest_with_salt(salt, password);
    constant_time_eq(computed.as_bytes(), expected.as_bytes())
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
