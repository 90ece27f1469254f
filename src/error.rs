//! Error types for the onboarding run
//!
//! Two layers: `RemoteError` is the aggregation service's own error envelope
//! (every remote failure carries a numeric code), and `OnboardError` is the
//! application-level taxonomy the workflow reports on.

use serde::Deserialize;
use thiserror::Error;

/// Error envelope returned by the aggregation service.
///
/// Decoded from the body of non-2xx responses. Transport failures and
/// unparseable bodies are folded into this shape with code `0` so that every
/// remote failure presents a numeric code to the workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[error("service error {code}: {message}")]
pub struct RemoteError {
    /// Numeric error code assigned by the service
    pub code: i64,
    /// Human-readable description from the service
    #[serde(default)]
    pub message: String,
}

/// Errors that can occur during an onboarding run
///
/// Only the "user already exists" service code is recovered from locally;
/// everything else is caught and reported at the workflow level.
#[derive(Error, Debug)]
pub enum OnboardError {
    /// Building the API client failed before any request was made
    #[error("connection setup failed: {0}")]
    Connection(String),

    /// Building the user session failed before any request was made
    #[error("session setup failed: {0}")]
    Session(String),

    /// The aggregation service reported a failure
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The account setup task never reached a terminal state within the
    /// configured attempt ceiling
    #[error("task polling gave up after {attempts} attempts")]
    PollTimeout {
        /// Number of status queries issued before giving up
        attempts: u32,
    },

    /// A step ran without the output of an earlier step
    #[error("missing input from an earlier step: {0}")]
    MissingInput(&'static str),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl OnboardError {
    /// Numeric service code, when this error originated remotely.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            OnboardError::Remote(remote) => Some(remote.code),
            _ => None,
        }
    }
}
