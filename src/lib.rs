//! # Faceverify
//!
//! Session and verification client for a two-image face verification service.
//!
//! The crate manages the bearer token lifecycle, validates and submits image
//! pairs for comparison, normalizes the several result shapes the backend is
//! known to return, and aggregates verification history into summary
//! statistics.
//!
//! ## Example
//!
//! ```rust,ignore
//! use faceverify::{ApiClient, AuthClient, ClientConfig, ImageFile, SessionStore, VerificationClient};
//!
//! let config = ClientConfig::load_default()?;
//! let session = SessionStore::in_memory();
//! let api = ApiClient::new(&config)?;
//!
//! AuthClient::new(api.clone(), session.clone())
//!     .login("alice", "hunter2")
//!     .await?;
//!
//! let left = ImageFile::from_path("left.jpg").await?;
//! let right = ImageFile::from_path("right.jpg").await?;
//! let outcome = VerificationClient::new(api, session, &config)
//!     .verify(Some(&left), Some(&right))
//!     .await?;
//! println!("match: {} ({:.1}%)", outcome.is_match, outcome.confidence * 100.0);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod api;
pub mod config;
pub mod models;
pub mod observability;
pub mod session;
pub mod ui;

pub use api::{
    ApiClient, AuthClient, CancellationToken, DiagnosticsClient, HistoryAggregator,
    VerificationClient,
};
pub use config::{ClientConfig, HttpConfig};
pub use models::{
    DataQuality, HistoryListing, HistoryRecord, HistorySummary, ImageFile, MatchResult,
    RawMetrics, ResultInterpreter, Session, UserRecord, VerificationOutcome,
};
pub use session::{FileTokenStorage, MemoryTokenStorage, SessionStore, TokenStorage};

/// Error type for faceverify operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | A client-side precondition failed, or signup was rejected |
/// | `Auth` | Token missing, expired, or credentials rejected |
/// | `Verification` | The backend rejected or failed to produce a result |
/// | `Transport` | Backend unreachable, timed out, or returned a malformed body |
/// | `Cancelled` | The caller cancelled an in-flight request |
/// | `OperationFailed` | Local I/O failed (token file, config file, log file) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A client-side precondition failed.
    ///
    /// Raised when:
    /// - An image is missing, not an image, or too large
    /// - The backend rejected a signup
    ///
    /// Image validation failures never reach the network.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Authentication is missing, expired, or was rejected.
    ///
    /// A 401 from an authenticated endpoint clears the local session before
    /// this is returned.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The backend rejected or failed to produce a verification result.
    #[error("verification failed: {0}")]
    Verification(String),

    /// The backend could not be reached or returned something unreadable.
    #[error("transport error during '{operation}': {cause}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The request was cancelled before it completed.
    #[error("operation '{operation}' was cancelled")]
    Cancelled {
        /// The operation that was cancelled.
        operation: String,
    },

    /// A local operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns the message carried by the error, without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::Auth(msg) | Self::Verification(msg) => msg,
            Self::Transport { cause, .. } | Self::OperationFailed { cause, .. } => cause,
            Self::Cancelled { operation } => operation,
        }
    }

    /// Returns true when the user must log in again to continue.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Result type alias for faceverify operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("Please upload both images".to_string());
        assert_eq!(
            err.to_string(),
            "validation failed: Please upload both images"
        );

        let err = Error::Transport {
            operation: "login".to_string(),
            cause: "connect error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "transport error during 'login': connect error"
        );

        let err = Error::Cancelled {
            operation: "verify".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'verify' was cancelled");
    }

    #[test]
    fn test_error_message_strips_prefix() {
        let err = Error::Auth("Session expired. Please login again.".to_string());
        assert_eq!(err.message(), "Session expired. Please login again.");
        assert!(err.requires_reauthentication());

        let err = Error::Verification("Verification failed".to_string());
        assert_eq!(err.message(), "Verification failed");
        assert!(!err.requires_reauthentication());
    }
}
