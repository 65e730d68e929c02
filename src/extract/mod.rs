//! Content extraction from decoded documents.
//!
//! - [`summarize`] walks the page tree and produces a title plus a summary.
//! - [`crawl`] and [`flatten`] describe every stored block for indexing.

mod budget;
mod crawl;
mod policy;
mod summary;
mod walker;

pub use budget::SummaryBudget;
pub use crawl::{crawl, crawl_blocks, flatten, BlockInfo, CrawlResult, IndexedBlock};
pub use policy::{
    ExtractionPolicy, SummaryMode, DEFAULT_SUMMARY_LENGTH, TABLE_CELL_SEPARATOR, UNBOUNDED_LENGTH,
};
pub use summary::{summarize, PageContent};
pub use walker::{BlockWalker, DescendAll, TraversalPolicy, Visit};
