//! Error types
//!
//! Crate-wide error enum. Module-specific errors (`RegistryError`,
//! `PayloadError`) convert into it with `?`.

use thiserror::Error;

use crate::client::host::HostPayload;
use crate::protocol::payload::PayloadError;
use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by session, handle and registry operations
#[derive(Debug, Error)]
pub enum Error {
    /// Stream identity or lookup failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// User-list payload could not be parsed
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// An attribute patch did not fit the attribute record
    #[error("Attribute patch rejected: {0}")]
    Attributes(#[source] serde_json::Error),

    /// The handle was reset and must not be reused
    #[error("{0} handle has been reset")]
    HandleReleased(&'static str),

    /// No pusher has been created for this session
    #[error("No pusher in session")]
    NoPusher,

    /// The host reported failure for a one-shot call
    #[error("Host call {op} failed: {payload}")]
    Host {
        /// Operation name
        op: &'static str,
        /// Failure payload as reported by the host
        payload: HostPayload,
    },

    /// The host completed a snapshot without an image path
    #[error("Snapshot failed")]
    SnapshotFailed,

    /// The host dropped the completion callback without invoking it
    #[error("Host dropped the completion of {0}")]
    HostDropped(&'static str),
}
