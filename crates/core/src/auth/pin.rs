//! PIN hashing with Argon2id.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
};
use rand::Rng;
use thiserror::Error;

/// Errors that can occur during PIN operations.
#[derive(Debug, Error)]
pub enum PinError {
    /// Failed to hash PIN.
    #[error("failed to hash PIN: {0}")]
    HashError(String),

    /// Failed to verify PIN.
    #[error("failed to verify PIN: {0}")]
    VerifyError(String),

    /// Invalid PIN hash format.
    #[error("invalid PIN hash format")]
    InvalidHash,
}

/// Hashing and verification of account PINs.
///
/// Implementations are called from a blocking thread.
pub trait SecretVerifier: Send + Sync {
    /// Hashes a PIN for storage.
    ///
    /// # Errors
    ///
    /// Returns `PinError::HashError` if hashing fails.
    fn hash(&self, pin: &str) -> Result<String, PinError>;

    /// Checks a PIN against a stored hash. Fails closed: any internal error is `false`.
    fn verify(&self, pin: &str, hash: &str) -> bool;
}

/// Argon2id implementation of [`SecretVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PinVerifier;

impl SecretVerifier for Argon2PinVerifier {
    fn hash(&self, pin: &str) -> Result<String, PinError> {
        hash_pin(pin)
    }

    fn verify(&self, pin: &str, hash: &str) -> bool {
        verify_pin(pin, hash).unwrap_or(false)
    }
}

/// Hashes a PIN using Argon2id.
///
/// # Returns
///
/// The hashed PIN in PHC string format.
///
/// # Errors
///
/// Returns `PinError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use swiftpay_core::auth::hash_pin;
///
/// let hash = hash_pin("12345").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_pin(pin: &str) -> Result<String, PinError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PinError::HashError(e.to_string()))?;

    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PinError::HashError(e.to_string()))
}

/// Verifies a PIN against a hash.
///
/// # Errors
///
/// Returns `PinError::InvalidHash` if the hash format is invalid.
/// Returns `PinError::VerifyError` if verification fails unexpectedly.
///
/// # Example
///
/// ```
/// use swiftpay_core::auth::{hash_pin, verify_pin};
///
/// let hash = hash_pin("12345").unwrap();
/// assert!(verify_pin("12345", &hash).unwrap());
/// assert!(!verify_pin("54321", &hash).unwrap());
/// ```
pub fn verify_pin(pin: &str, hash: &str) -> Result<bool, PinError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PinError::InvalidHash)?;

    match Argon2::default().verify_password(pin.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PinError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pin() {
        let hash = hash_pin("12345").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "12345");
    }

    #[test]
    fn test_verify_pin() {
        let hash = hash_pin("12345").unwrap();
        assert!(verify_pin("12345", &hash).unwrap());
        assert!(!verify_pin("12346", &hash).unwrap());
    }

    #[test]
    fn test_same_pin_different_hashes() {
        assert_ne!(hash_pin("12345").unwrap(), hash_pin("12345").unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(matches!(
            verify_pin("12345", "invalid_hash"),
            Err(PinError::InvalidHash)
        ));
    }

    #[test]
    fn test_verifier_fails_closed() {
        let verifier = Argon2PinVerifier;
        assert!(!verifier.verify("12345", "invalid_hash"));
        assert!(!verifier.verify("12345", ""));

        let hash = verifier.hash("12345").unwrap();
        assert!(verifier.verify("12345", &hash));
    }
}
