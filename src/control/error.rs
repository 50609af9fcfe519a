//! Control client error taxonomy

use thiserror::Error;

use super::protocol::UninstallResponse;
use crate::config::{ConfigError, RunMode};

/// Errors surfaced by lifecycle control operations.
///
/// Nothing here is retried automatically; retry policy belongs to the
/// caller. The only non-error outcome that looks like a failure on the wire
/// is the idempotent uninstall-not-found case, which the client normalizes
/// to success before these variants come into play.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Network-level failure (refused connection, timeout, aborted body),
    /// surfaced verbatim with its cause
    #[error("control request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success HTTP status
    #[error("{operation} http failed with code {status}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
    },

    /// Response body was not the expected JSON shape
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint rejected the install
    #[error("install biz failed: {message}")]
    InstallFailed { message: String },

    /// Endpoint rejected the uninstall for a reason other than the module
    /// already being absent; carries the full response for diagnosis
    #[error("uninstall biz failed: {response:?}")]
    UninstallFailed { response: UninstallResponse },

    /// The requested run mode is declared but has no implementation
    #[error("run mode {mode} is not implemented")]
    Unimplemented { mode: RunMode },

    /// The target host description is unusable for this operation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ControlError {
    /// True when the failure means "feature unavailable" rather than
    /// "operation failed", so callers can branch on it.
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, ControlError::Unimplemented { .. })
    }
}
