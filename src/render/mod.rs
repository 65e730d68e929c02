//! Rendering of extraction results to Markdown and JSON.

mod cleanup;
mod json;
mod markdown;
mod options;
mod result;
pub mod visitor;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ExtractionStats, MarkdownResult};
pub use visitor::{
    BlockVisitor, CompositeVisitor, DefaultVisitor, MaxHeadingDepthVisitor, SimpleTableVisitor,
    SkipImagesVisitor, VisitorAction,
};
