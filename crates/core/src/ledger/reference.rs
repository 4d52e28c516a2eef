//! Transaction reference generation.
//!
//! Format: `TRX-YYYYMMDD-XXXXXXXXXX`, UTC date plus ten random characters
//! from `[A-Z0-9]`. Randomness only makes collisions rare; uniqueness is
//! enforced by the store, and a collision surfaces as
//! [`LedgerError::DuplicateReference`](super::LedgerError::DuplicateReference)
//! which the engine retries with a fresh reference.

use chrono::{DateTime, Utc};
use rand::Rng;

const PREFIX: &str = "TRX";
const SUFFIX_LEN: usize = 10;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a reference for a record created at `now`.
#[must_use]
pub fn generate_reference(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect();
    format!("{PREFIX}-{}-{suffix}", now.format("%Y%m%d"))
}

/// Returns true if `reference` has the generated shape.
#[must_use]
pub fn is_valid_reference(reference: &str) -> bool {
    let mut parts = reference.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == PREFIX
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| CHARSET.contains(&b))
}
