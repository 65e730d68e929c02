//! # blocktext
//!
//! Content extraction for replicated block-tree documents.
//!
//! This library reads decoded snapshots of block documents and derives
//! flat artifacts from them: a title with a bounded summary, an indexable
//! list of every block with its references, and a Markdown rendering. It
//! also lists the documents a workspace root refers to.
//!
//! ## Quick Start
//!
//! ```
//! use blocktext::{parse_page, SummaryMode};
//!
//! fn main() -> blocktext::Result<()> {
//!     let snapshot = br#"{
//!         "blocks": {
//!             "root": { "sys:flavour": "affine:page", "sys:children": ["p"],
//!                       "prop:title": "Groceries" },
//!             "p":    { "sys:flavour": "affine:paragraph", "prop:text": "Milk and eggs" }
//!         }
//!     }"#;
//!
//!     let page = parse_page(snapshot, SummaryMode::default())?.unwrap();
//!     assert_eq!(page.title, "Groceries");
//!     assert_eq!(page.summary, "Milk and eggs");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Summaries**: soft-bounded text in reading order, or full content
//! - **Indexing**: every stored block with content, blobs and doc references
//! - **Markdown**: headings, lists, code, tables, links, optional block ids
//! - **Workspace roots**: name, avatar and referenced document ids
//! - **Parallel processing**: uses Rayon for batches of snapshots
//! - **Pluggable decoding**: any replication engine behind [`SnapshotDecoder`]

pub mod decode;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use decode::{DecodeOptions, ErrorMode, JsonSnapshotDecoder, SnapshotDecoder};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SnapshotFormat};
pub use error::{Error, Result};
pub use extract::{BlockInfo, CrawlResult, IndexedBlock, PageContent, SummaryMode};
pub use model::{Block, Document, Flavour, PropValue, TextDelta, WorkspaceInfo};
pub use render::{
    BlockVisitor, CleanupOptions, CleanupPreset, JsonFormat, MarkdownResult, RenderOptions,
};

use rayon::prelude::*;
use std::path::Path;

/// Read the workspace name and avatar from a workspace root snapshot.
///
/// Returns `Ok(None)` when the snapshot has no metadata region.
///
/// # Example
///
/// ```
/// use blocktext::parse_workspace_root;
///
/// let root = br#"{"meta": {"name": "Team", "avatar": "av-1", "pages": []}}"#;
/// let info = parse_workspace_root(root).unwrap().unwrap();
/// assert_eq!(info.name, "Team");
/// ```
pub fn parse_workspace_root(bytes: &[u8]) -> Result<Option<WorkspaceInfo>> {
    Extractor::new().workspace_info(bytes)
}

/// Extract title and summary from a page snapshot.
///
/// Returns `Ok(None)` when the snapshot holds no page block.
pub fn parse_page(bytes: &[u8], mode: SummaryMode) -> Result<Option<PageContent>> {
    Extractor::new()
        .with_summary_mode(mode)
        .load("", bytes)?
        .summary()
}

/// Extract title and summary from a page snapshot on disk.
///
/// # Example
///
/// ```no_run
/// use blocktext::{parse_page_file, SummaryMode};
///
/// let page = parse_page_file("page.snapshot", SummaryMode::Unbounded).unwrap();
/// ```
pub fn parse_page_file<P: AsRef<Path>>(path: P, mode: SummaryMode) -> Result<Option<PageContent>> {
    let bytes = std::fs::read(path)?;
    parse_page(&bytes, mode)
}

/// Flatten every block of a page snapshot for indexing.
///
/// Blocks unreachable from the page root are included.
pub fn flatten_blocks(doc_id: &str, bytes: &[u8]) -> Result<Vec<IndexedBlock>> {
    Ok(Extractor::new().load(doc_id, bytes)?.blocks())
}

/// Crawl a page snapshot: every block plus title and default-length summary.
pub fn crawl_doc(doc_id: &str, bytes: &[u8]) -> Result<CrawlResult> {
    Extractor::new().load(doc_id, bytes)?.crawl()
}

/// Render a page snapshot as Markdown.
///
/// With `ai_editable`, every block is preceded by a comment carrying its
/// identifier and flavour.
pub fn project_markdown(doc_id: &str, bytes: &[u8], ai_editable: bool) -> Result<MarkdownResult> {
    Extractor::new()
        .with_ai_editable(ai_editable)
        .load(doc_id, bytes)?
        .markdown()
}

/// List every document identifier referenced from a workspace root snapshot.
///
/// Trashed documents are included; use [`Extractor::with_decode_options`]
/// with [`DecodeOptions::without_trash`] to leave them out.
pub fn harvest_referenced_doc_ids(bytes: &[u8]) -> Result<Vec<String>> {
    Extractor::new().referenced_doc_ids(bytes)
}

/// Extract title and summary from many page snapshots.
///
/// Results are returned in input order. Snapshots are processed on the
/// Rayon thread pool unless `options.parallel` is off.
pub fn parse_pages_parallel<B>(
    snapshots: &[B],
    mode: SummaryMode,
    options: &DecodeOptions,
) -> Vec<Result<Option<PageContent>>>
where
    B: AsRef<[u8]> + Sync,
{
    let extractor = Extractor::new()
        .with_decode_options(options.clone())
        .with_summary_mode(mode);
    let parse_one = |bytes: &B| extractor.load("", bytes.as_ref())?.summary();

    if options.parallel {
        snapshots.par_iter().map(parse_one).collect()
    } else {
        snapshots.iter().map(parse_one).collect()
    }
}

/// Builder for decoding snapshots and extracting content.
///
/// # Example
///
/// ```
/// use blocktext::Extractor;
///
/// let snapshot = br#"{"blocks": {
///     "root": {"sys:flavour": "affine:page", "sys:children": ["p"], "prop:title": "T"},
///     "p": {"sys:flavour": "affine:paragraph", "prop:text": "Body"}
/// }}"#;
///
/// let markdown = Extractor::new()
///     .with_frontmatter()
///     .lenient()
///     .load("doc-1", snapshot)?
///     .markdown()?;
/// assert!(markdown.markdown.contains("Body"));
/// # Ok::<(), blocktext::Error>(())
/// ```
pub struct Extractor {
    decoder: Box<dyn SnapshotDecoder>,
    decode_options: DecodeOptions,
    summary_mode: SummaryMode,
    render_options: RenderOptions,
}

impl Extractor {
    /// Create a new extractor using the JSON snapshot decoder.
    pub fn new() -> Self {
        Self {
            decoder: Box::new(JsonSnapshotDecoder::new()),
            decode_options: DecodeOptions::default(),
            summary_mode: SummaryMode::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Use a custom snapshot decoder.
    pub fn with_decoder<D: SnapshotDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Set decode options. The decoder in use is kept.
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// Enable lenient decoding (skip malformed blocks).
    pub fn lenient(mut self) -> Self {
        self.decode_options = self.decode_options.lenient();
        self
    }

    /// Set the summary mode.
    pub fn with_summary_mode(mut self, mode: SummaryMode) -> Self {
        self.summary_mode = mode;
        self
    }

    /// Set the summary length; `-1` disables the bound.
    pub fn with_max_summary_length(mut self, max_length: i64) -> Self {
        self.summary_mode = SummaryMode::from_max_length(max_length);
        self
    }

    /// Extract full content instead of a bounded summary.
    pub fn unbounded(mut self) -> Self {
        self.summary_mode = SummaryMode::Unbounded;
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Enable or disable block identity comments in Markdown.
    pub fn with_ai_editable(mut self, enabled: bool) -> Self {
        self.render_options = self.render_options.with_ai_editable(enabled);
        self
    }

    /// Enable frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Get the decoder in use.
    pub fn decoder(&self) -> &dyn SnapshotDecoder {
        self.decoder.as_ref()
    }

    /// Decode a page snapshot.
    pub fn load(&self, doc_id: &str, bytes: &[u8]) -> Result<LoadedDoc> {
        let document = self
            .decoder
            .decode_document(bytes, doc_id, &self.decode_options)?;
        Ok(LoadedDoc {
            document,
            summary_mode: self.summary_mode,
            render_options: self.render_options.clone(),
        })
    }

    /// Decode a page snapshot from disk.
    pub fn load_file<P: AsRef<Path>>(&self, doc_id: &str, path: P) -> Result<LoadedDoc> {
        let bytes = std::fs::read(path)?;
        self.load(doc_id, &bytes)
    }

    /// Read name and avatar from a workspace root snapshot.
    pub fn workspace_info(&self, bytes: &[u8]) -> Result<Option<WorkspaceInfo>> {
        let root = self
            .decoder
            .decode_workspace_root(bytes, &self.decode_options)?;
        Ok(root.meta.as_ref().map(WorkspaceInfo::from))
    }

    /// List documents referenced from a workspace root snapshot.
    pub fn referenced_doc_ids(&self, bytes: &[u8]) -> Result<Vec<String>> {
        self.decoder
            .referenced_doc_ids(bytes, &self.decode_options)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded page document ready for extraction.
pub struct LoadedDoc {
    /// The decoded document
    pub document: Document,
    summary_mode: SummaryMode,
    render_options: RenderOptions,
}

impl LoadedDoc {
    /// Title and summary, or `None` without a page block.
    pub fn summary(&self) -> Result<Option<PageContent>> {
        extract::summarize(&self.document, self.summary_mode)
    }

    /// Every block plus title and default-length summary.
    pub fn crawl(&self) -> Result<CrawlResult> {
        extract::crawl(&self.document)
    }

    /// Every block, tagged with the document id.
    pub fn blocks(&self) -> Vec<IndexedBlock> {
        extract::flatten(&self.document)
    }

    /// Markdown projection.
    pub fn markdown(&self) -> Result<MarkdownResult> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Markdown projection with a custom visitor.
    pub fn markdown_with_visitor<V: BlockVisitor + 'static>(
        &self,
        visitor: V,
    ) -> Result<MarkdownResult> {
        render::MarkdownRenderer::new(self.render_options.clone())
            .with_visitor(visitor)
            .render(&self.document)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
