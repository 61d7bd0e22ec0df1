//! Registry error types
//!
//! Error types for stream addressing and lookup.

use thiserror::Error;

use super::id::StreamId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Stream ID without a usable separator
    #[error("Invalid stream ID: {0:?}")]
    InvalidStreamId(String),
    /// No live stream with this ID
    #[error("Stream not found: {0}")]
    StreamNotFound(StreamId),
}
