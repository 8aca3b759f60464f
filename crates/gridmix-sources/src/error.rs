//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use thiserror::Error;

use crate::source::DataSource;

/// Convenience alias for adapter results.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Runtime failures of a live fetch. All of them are recoverable by falling
/// back to synthetic data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request exceeded its configured duration and was cancelled.
    #[error("{data_source} request timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Source whose request timed out.
        data_source: DataSource,
        /// Configured timeout that elapsed.
        after: Duration,
    },
    /// The upstream answered with a non-success HTTP status.
    #[error("{data_source} responded with HTTP status {status}")]
    Status {
        /// Source that answered.
        data_source: DataSource,
        /// Numeric HTTP status code.
        status: u16,
    },
    /// The body was not the expected JSON array of records.
    #[error("{data_source} returned a malformed payload: {reason}")]
    MalformedPayload {
        /// Source that produced the payload.
        data_source: DataSource,
        /// Human readable description of the problem.
        reason: String,
    },
    /// Connection, TLS or body transfer failure.
    #[error("{data_source} request failed: {message}")]
    Network {
        /// Source being contacted.
        data_source: DataSource,
        /// Transport error description.
        message: String,
    },
}

impl FetchError {
    /// True when the request was cancelled by its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// Source the failed request was addressed to.
    pub fn data_source(&self) -> DataSource {
        match self {
            FetchError::Timeout { data_source, .. }
            | FetchError::Status { data_source, .. }
            | FetchError::MalformedPayload { data_source, .. }
            | FetchError::Network { data_source, .. } => *data_source,
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Status { .. } => "status",
            FetchError::MalformedPayload { .. } => "malformed_payload",
            FetchError::Network { .. } => "network",
        }
    }
}

/// Errors surfaced to callers of the adapter boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Disabled or unconfigured source, unknown identifier, or missing credential.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The source has no working data path.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// A live fetch failure that was not recovered locally.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl SourceError {
    /// Configuration and not-implemented errors must reach the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SourceError::Configuration(_) | SourceError::NotImplemented(_)
        )
    }
}
