//! Password Hashing
//! Mission: One-way salted hashing with constant-time verification

use bcrypt::BcryptError;
use tracing::debug;

/// bcrypt work factor. Stored hashes embed the cost they were created with,
/// so this only affects newly hashed passwords.
const BCRYPT_COST: u32 = 10;

/// Password hasher backed by bcrypt.
///
/// A fresh salt is generated for every hash and embedded in the output
/// string, so no separate salt storage is needed. Comparison happens inside
/// the bcrypt crate in constant time.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password for storage.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(PasswordError)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A stored hash that fails to parse counts as a mismatch, not an error;
    /// only genuine internal failures surface as `Err`.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        match bcrypt::verify(plaintext, stored_hash) {
            Ok(valid) => Ok(valid),
            Err(
                e @ (BcryptError::InvalidHash(_)
                | BcryptError::InvalidPrefix(_)
                | BcryptError::InvalidCost(_)
                | BcryptError::InvalidSaltLen(_)
                | BcryptError::InvalidBase64(_)),
            ) => {
                debug!("Stored hash failed to parse: {}", e);
                Ok(false)
            }
            Err(e) => Err(PasswordError(e)),
        }
    }
}

/// Internal hashing failure (entropy source or comparison machinery).
#[derive(Debug)]
pub struct PasswordError(BcryptError);

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "password hashing failed: {}", self.0)
    }
}

impl std::error::Error for PasswordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hasher = PasswordHasher::new();

        let hash = hasher.hash("s3cret").unwrap();
        assert_ne!(hash, "s3cret");

        assert!(hasher.verify("s3cret", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_each_hash_gets_a_fresh_salt() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first).unwrap());
        assert!(hasher.verify("same-password", &second).unwrap());
    }

    #[test]
    fn test_cost_embedded_in_hash() {
        let hasher = PasswordHasher::new();

        let hash = hasher.hash("s3cret").unwrap();
        assert!(hash.contains("$10$"), "unexpected hash format: {}", hash);
    }

    #[test]
    fn test_malformed_stored_hash_is_a_mismatch() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify("s3cret", "not-a-bcrypt-hash").unwrap());
        assert!(!hasher.verify("s3cret", "").unwrap());
        assert!(!hasher.verify("s3cret", "$2b$10$truncated").unwrap());
    }
}
