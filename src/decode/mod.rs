//! Snapshot decoding.
//!
//! The replication engine that produces snapshots is an external
//! collaborator. This module only fixes its decode contract as the
//! [`SnapshotDecoder`] trait and ships [`JsonSnapshotDecoder`] for the
//! materialized JSON form of a replicated document.
//!
//! # Example
//!
//! ```
//! use blocktext::decode::{DecodeOptions, JsonSnapshotDecoder, SnapshotDecoder};
//!
//! let bytes = br#"{"blocks": {"root": {"sys:flavour": "affine:page", "prop:title": "Hi"}}}"#;
//! let doc = JsonSnapshotDecoder::new()
//!     .decode_document(bytes, "doc-1", &DecodeOptions::default())
//!     .unwrap();
//! assert_eq!(doc.title().as_deref(), Some("Hi"));
//! ```

mod json;
mod options;

pub use json::JsonSnapshotDecoder;
pub use options::{DecodeOptions, ErrorMode};

use crate::error::Result;
use crate::model::{Document, WorkspaceRoot};

/// Trait for snapshot decoders.
///
/// Implement this trait to plug in another replication engine. Options are
/// passed on every call so that one decoder serves any configuration.
pub trait SnapshotDecoder: Send + Sync {
    /// Get the name of this decoder.
    fn name(&self) -> &str;

    /// Decode the regions of a snapshot.
    ///
    /// Fails with a decode error on malformed bytes. Missing regions are
    /// reported as `None` fields, not as errors.
    fn decode_workspace_root(&self, bytes: &[u8], options: &DecodeOptions)
        -> Result<WorkspaceRoot>;

    /// Decode the block region of a page snapshot.
    ///
    /// A snapshot without a block region yields an empty document.
    fn decode_document(
        &self,
        bytes: &[u8],
        doc_id: &str,
        options: &DecodeOptions,
    ) -> Result<Document> {
        let root = self.decode_workspace_root(bytes, options)?;
        let mut doc = root.blocks.unwrap_or_default();
        doc.id = doc_id.to_string();
        Ok(doc)
    }

    /// Identifiers of every document referenced from a workspace root.
    ///
    /// Trashed documents are left out unless `options.include_trash` is set.
    fn referenced_doc_ids(&self, bytes: &[u8], options: &DecodeOptions) -> Result<Vec<String>> {
        let root = self.decode_workspace_root(bytes, options)?;
        Ok(root
            .meta
            .map(|meta| meta.doc_ids(options.include_trash))
            .unwrap_or_default())
    }
}
