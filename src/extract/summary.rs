//! Page title and summary extraction.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Document;

use super::{BlockWalker, ExtractionPolicy, SummaryBudget, SummaryMode};

/// Title and summary of a page document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Title of the page block
    pub title: String,

    /// Concatenated text of the page, bounded by the summary mode
    pub summary: String,
}

/// Extract title and summary from a decoded document.
///
/// Returns `Ok(None)` when the document is empty or has no page block.
/// A child identifier that does not resolve ends the walk early; the text
/// gathered up to that point is returned. A block reachable twice is an
/// error.
///
/// # Example
///
/// ```
/// use blocktext::extract::{summarize, SummaryMode};
/// use blocktext::model::{Block, Document};
///
/// let doc = Document::from_blocks("d", vec![
///     Block::page("root", "Notes").with_children(["p"]),
///     Block::paragraph("p", "Hello"),
/// ]);
/// let content = summarize(&doc, SummaryMode::default()).unwrap().unwrap();
/// assert_eq!(content.title, "Notes");
/// assert_eq!(content.summary, "Hello");
/// ```
pub fn summarize(doc: &Document, mode: SummaryMode) -> Result<Option<PageContent>> {
    if doc.is_empty() {
        return Ok(None);
    }

    let roots: Vec<&str> = doc.pages().map(|page| page.id.as_str()).collect();
    if roots.is_empty() {
        log::debug!("Document '{}' has no page block", doc.id);
        return Ok(None);
    }

    let title = doc.title().unwrap_or_default();
    let policy = ExtractionPolicy::new(mode);
    let mut budget = SummaryBudget::new(mode);
    let mut summary = String::new();

    let mut walker = BlockWalker::with_roots(doc, roots, &policy);
    for visit in walker.by_ref() {
        let visit = visit?;
        if let Some(text) = policy.contribution(visit.block) {
            budget.offer(&text, &mut summary);
        }
    }

    log::debug!(
        "Summarized '{}': {} blocks visited, {} chars{}",
        doc.id,
        walker.visited_count(),
        summary.chars().count(),
        if walker.halted_at().is_some() {
            " (walk stopped early)"
        } else {
            ""
        }
    );

    Ok(Some(PageContent { title, summary }))
}
