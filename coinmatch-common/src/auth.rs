//! Password hashing and session token helpers
//!
//! Pure functions only; no HTTP framework or database dependencies.
//! Token lookup and user resolution live in the API crate.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Iteration count for password hashing
const HASH_ITERATIONS: u32 = 10_000;

/// Generate a random 16-byte salt, hex encoded
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt using iterated SHA-256
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut hasher = Sha256::new();
        hasher.update(&digest);
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

/// Verify a password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Generate a new opaque session token (32 hex characters)
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Compute a token expiry timestamp from its creation time
pub fn token_expiry(created_at: DateTime<Utc>, expiry_minutes: i64) -> DateTime<Utc> {
    created_at + Duration::minutes(expiry_minutes)
}
