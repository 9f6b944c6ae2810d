//! Error types for dcost
//!
//! This module defines the error types used throughout the dcost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use dcost_core::error::{DcostError, Result};
//!
//! fn parse_body(body: &str) -> Result<serde_json::Value> {
//!     // serde_json::Error converts into DcostError::Json
//!     Ok(serde_json::from_str(body)?)
//! }
//!
//! assert!(parse_body("not json").is_err());
//! ```

use thiserror::Error;

/// Main error type for dcost operations
///
/// Covers the fetch, authentication and decode failures that abort a
/// report pass, plus configuration and argument errors raised at startup.
#[derive(Error, Debug)]
pub enum DcostError {
    /// The token provider handed back the anonymous sentinel
    #[error("Authentication expired: the API proxy returned an anonymous token")]
    AuthenticationExpired,

    /// Non-success HTTP status from a cost endpoint
    #[error("Upstream request to {endpoint} failed with status {status}: {body}")]
    UpstreamRequestFailed {
        /// Endpoint URL that was queried
        endpoint: String,
        /// HTTP status code returned
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Composite allocation name does not match the requested label list
    #[error(
        "Malformed allocation name '{name}': expected {expected} fields ({labels}), found {found}"
    )]
    MalformedRecord {
        /// The offending composite name
        name: String,
        /// Number of fields the query asked for
        expected: usize,
        /// Number of fields actually present
        found: usize,
        /// Comma-separated label list used for decoding
        labels: String,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A fetch task panicked or was cancelled before completing
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),
}

impl DcostError {
    /// Single message shown to the user when a report pass fails
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationExpired => "Your session has expired. Please sign in again \
                 or redeploy the cost report to refresh its credentials."
                .to_string(),
            Self::UpstreamRequestFailed { status, .. } => format!(
                "The cost service could not be reached (HTTP {status}). Try again or pick another window."
            ),
            Self::MalformedRecord { .. } => format!(
                "The cost service returned data in an unexpected shape and the report cannot be built: {self}"
            ),
            other => format!("Failed to build the cost report: {other}"),
        }
    }
}

/// Convenience type alias for Results in dcost
///
/// # Example
///
/// ```
/// use dcost_core::Result;
///
/// fn total() -> Result<f64> {
///     Ok(12.5)
/// }
/// ```
pub type Result<T> = std::result::Result<T, DcostError>;
