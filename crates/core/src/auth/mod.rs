//! PIN hashing and verification.
//!
//! PINs are hashed with Argon2id and never compared in plaintext. The ledger
//! engine depends on the [`SecretVerifier`] capability rather than on Argon2
//! directly.

mod pin;

pub use pin::{Argon2PinVerifier, PinError, SecretVerifier, hash_pin, verify_pin};
