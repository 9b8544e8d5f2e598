//! Error types for the directory engine.
//!
//! One error type per boundary:
//!
//! - [`FetchError`] - dataset retrieval failures (contained by the fetcher)
//! - [`StoreError`] - persisted state I/O
//! - [`RelayError`] - outbound relay transport failures
//! - [`ContactError`] - user-visible outcomes of a contact submission
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Dataset Fetch Errors
// =============================================================================

/// Errors while retrieving the dataset.
///
/// These never reach the caller of [`crate::fetch::DatasetFetcher::fetch`],
/// which degrades to an empty record set; they are logged instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connection, read).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The source answered with a non-success status.
    #[error("Source answered with HTTP status {0}")]
    HttpStatus(u16),

    /// The source returned a markup document instead of tabular data.
    #[error("Received HTML instead of CSV; the sheet must be shared as 'Anyone with the link' (Viewer)")]
    MarkupResponse,

    /// Failed to read a local export.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// State Store Errors
// =============================================================================

/// Errors from the persisted state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("State store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("State store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Relay Errors
// =============================================================================

/// Errors from the outbound relay call.
///
/// Only transport failures are observable; the relay's own answer is not.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request could not be dispatched.
    #[error("Relay request failed: {0}")]
    Transport(String),
}

// =============================================================================
// Contact Errors
// =============================================================================

/// Outcome errors of a contact or report submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// A required form field is missing or malformed.
    #[error("Invalid form: {0}")]
    InvalidForm(String),

    /// The rolling daily cap is exhausted; nothing was sent.
    #[error("Daily limit of {limit} messages reached. Please try again in 24 hours.")]
    QuotaExceeded { limit: u32 },

    /// The relay call failed at the network level.
    #[error("Connection error while sending the message: {0}")]
    Connection(String),

    /// The session is not in a state that accepts this action.
    #[error("Action not allowed while {from}")]
    InvalidTransition { from: &'static str },
}

impl From<RelayError> for ContactError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Transport(msg) => ContactError::Connection(msg),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset retrieval.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for state store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Result type for contact submissions.
pub type ContactResult<T> = Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_becomes_connection_error() {
        let relay_err = RelayError::Transport("connection refused".into());
        let contact_err: ContactError = relay_err.into();
        assert!(matches!(contact_err, ContactError::Connection(_)));
        assert!(contact_err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_quota_message_states_limit() {
        let err = ContactError::QuotaExceeded { limit: 10 };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_markup_error_mentions_sharing() {
        let msg = FetchError::MarkupResponse.to_string();
        assert!(msg.contains("HTML"));
        assert!(msg.contains("Anyone with the link"));
    }
}
