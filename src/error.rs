//! Error types for blocktext library.

use std::io;
use thiserror::Error;

/// Result type alias for blocktext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding snapshots and extracting content.
///
/// Absence of an expected region (no `blocks`, no `meta`, no page block) is
/// never an error; the affected operations return `Ok(None)` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes are not a snapshot encoding this decoder understands.
    #[error("Unknown snapshot format")]
    UnknownFormat,

    /// The snapshot is corrupt or structurally invalid.
    #[error("Snapshot decode error: {0}")]
    Decode(String),

    /// A block entry in the snapshot could not be interpreted.
    #[error("Malformed block '{block_id}': {reason}")]
    MalformedBlock {
        /// Key of the offending block entry
        block_id: String,
        /// What is wrong with it
        reason: String,
    },

    /// A block was reached twice while walking the tree.
    #[error("Block '{block_id}' is reachable more than once (cycle or shared child)")]
    CyclicReference {
        /// The block reached a second time
        block_id: String,
    },

    /// Error during rendering (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error comes from malformed input bytes.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat | Error::Decode(_) | Error::MalformedBlock { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => Error::Io(err.into()),
            _ => Error::Decode(err.to_string()),
        }
    }
}
