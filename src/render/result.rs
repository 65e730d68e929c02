//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Result of projecting a document to Markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownResult {
    /// Page title (empty without a page block)
    pub title: String,

    /// Rendered Markdown
    pub markdown: String,

    /// Extraction statistics, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExtractionStats>,
}

impl MarkdownResult {
    /// Create a result without statistics.
    pub fn new(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            stats: None,
        }
    }

    /// Get the Markdown length in bytes.
    pub fn content_len(&self) -> usize {
        self.markdown.len()
    }
}

/// Statistics collected during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of blocks visited
    pub block_count: u32,

    /// Number of plain paragraphs and quotes
    pub paragraph_count: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of list items
    pub list_item_count: u32,

    /// Number of code blocks
    pub code_block_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Number of dividers
    pub divider_count: u32,

    /// Number of links to other documents
    pub doc_link_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.block_count += other.block_count;
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.code_block_count += other.code_block_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.divider_count += other.divider_count;
        self.doc_link_count += other.doc_link_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_extraction_stats_merge() {
        let mut stats1 = ExtractionStats {
            paragraph_count: 5,
            table_count: 2,
            ..Default::default()
        };
        let stats2 = ExtractionStats {
            paragraph_count: 3,
            table_count: 1,
            image_count: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.image_count, 4);
    }

    #[test]
    fn test_stats_omitted_from_json_when_absent() {
        let result = MarkdownResult::new("T", "body");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("stats").is_none());
        assert_eq!(result.content_len(), 4);
    }
}
