//! Account and session types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Public account information returned by signup and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier (`_id` on the wire).
    #[serde(alias = "_id")]
    pub id: String,
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
    /// When the account was created.
    #[serde(
        default,
        deserialize_with = "super::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// An established session, as returned by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    /// The bearer token.
    pub access_token: SecretString,
    /// Token type reported by the backend (normally `bearer`).
    pub token_type: String,
}
