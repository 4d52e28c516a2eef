//! Authentication types for JWT and account onboarding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Account role (`user`, `agent` or `admin`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(account_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the account ID from claims.
    #[must_use]
    pub const fn account_id(&self) -> Uuid {
        self.sub
    }
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Full name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Mobile number, used as the account's public handle.
    #[validate(length(min = 5, max = 20))]
    pub mobile: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// National ID number.
    #[validate(length(min = 5, max = 30))]
    pub nid: String,
    /// Five digit PIN.
    #[validate(length(equal = 5), custom(function = "validate_pin_digits"))]
    pub pin: String,
    /// Requested role: `user` (default), `agent` or `admin`.
    #[serde(default = "default_account_type")]
    pub account_type: String,
}

fn default_account_type() -> String {
    "user".to_string()
}

fn validate_pin_digits(pin: &str) -> Result<(), validator::ValidationError> {
    if pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("pin_digits"))
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Mobile number or email.
    #[validate(length(min = 1))]
    pub identifier: String,
    /// Account PIN.
    #[validate(length(min = 1))]
    pub pin: String,
}

/// Access token returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

impl TokenResponse {
    /// Creates a bearer token response.
    #[must_use]
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
