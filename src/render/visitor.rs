//! Visitor pattern for customizing Markdown rendering.
//!
//! A visitor sees each block before the renderer emits it and can keep the
//! default output, replace it, or drop it.
//!
//! # Example
//!
//! ```
//! use blocktext::model::TableGrid;
//! use blocktext::render::visitor::{BlockVisitor, VisitorAction};
//!
//! struct OmitTables;
//!
//! impl BlockVisitor for OmitTables {
//!     fn visit_table(&mut self, _grid: &TableGrid) -> VisitorAction {
//!         VisitorAction::Replace("<!-- table omitted -->\n\n".to_string())
//!     }
//! }
//! ```

use crate::model::{Block, TableGrid};

/// Action returned by visitor methods to control rendering behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Continue with default rendering.
    #[default]
    Continue,

    /// Replace the element with custom output.
    Replace(String),

    /// Skip this element entirely (produce no output).
    Skip,
}

impl VisitorAction {
    /// Check if this action indicates the element should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, VisitorAction::Skip)
    }

    /// Check if this action provides replacement content.
    pub fn is_replace(&self) -> bool {
        matches!(self, VisitorAction::Replace(_))
    }

    /// Get replacement content if available.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            VisitorAction::Replace(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for visiting blocks during rendering.
///
/// All methods return `VisitorAction::Continue` by default.
pub trait BlockVisitor: Send + Sync {
    /// Called for every block before anything else.
    ///
    /// `Skip` drops the block together with its descendants. `Replace`
    /// substitutes the block's own output; its children are still rendered.
    fn visit_block(&mut self, block: &Block, depth: usize) -> VisitorAction {
        let _ = (block, depth);
        VisitorAction::Continue
    }

    /// Called before rendering a heading paragraph.
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        let _ = (text, level);
        VisitorAction::Continue
    }

    /// Called before rendering a list item.
    ///
    /// `level` is the list nesting level, starting at 0.
    fn visit_list_item(&mut self, block: &Block, level: usize, ordered: bool) -> VisitorAction {
        let _ = (block, level, ordered);
        VisitorAction::Continue
    }

    /// Called before rendering a code block.
    fn visit_code(&mut self, code: &str, language: Option<&str>) -> VisitorAction {
        let _ = (code, language);
        VisitorAction::Continue
    }

    /// Called before rendering an image.
    fn visit_image(&mut self, source_id: &str, caption: Option<&str>) -> VisitorAction {
        let _ = (source_id, caption);
        VisitorAction::Continue
    }

    /// Called before rendering a table.
    fn visit_table(&mut self, grid: &TableGrid) -> VisitorAction {
        let _ = grid;
        VisitorAction::Continue
    }

    /// Called before rendering a divider.
    fn visit_divider(&mut self) -> VisitorAction {
        VisitorAction::Continue
    }

    /// Called once before the first block.
    fn on_document_start(&mut self, title: &str) {
        let _ = title;
    }

    /// Called once after the last block.
    fn on_document_end(&mut self) {}
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl BlockVisitor for DefaultVisitor {}

/// Visitor that skips all images.
#[derive(Debug, Clone, Default)]
pub struct SkipImagesVisitor;

impl BlockVisitor for SkipImagesVisitor {
    fn visit_image(&mut self, _source_id: &str, _caption: Option<&str>) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that renders tables as pipe-separated lines.
#[derive(Debug, Clone, Default)]
pub struct SimpleTableVisitor;

impl BlockVisitor for SimpleTableVisitor {
    fn visit_table(&mut self, grid: &TableGrid) -> VisitorAction {
        let mut output = String::new();
        for row in grid.row_texts() {
            output.push_str(&row.join(" | "));
            output.push('\n');
        }
        output.push('\n');
        VisitorAction::Replace(output)
    }
}

/// Visitor that limits heading depth.
#[derive(Debug, Clone)]
pub struct MaxHeadingDepthVisitor {
    max_level: u8,
}

impl MaxHeadingDepthVisitor {
    /// Create a visitor that limits headings to the specified max level.
    pub fn new(max_level: u8) -> Self {
        Self {
            max_level: max_level.clamp(1, 6),
        }
    }
}

impl BlockVisitor for MaxHeadingDepthVisitor {
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        let effective_level = level.min(self.max_level);
        let prefix = "#".repeat(effective_level as usize);
        VisitorAction::Replace(format!("{} {}\n\n", prefix, text))
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
#[derive(Default)]
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn BlockVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: BlockVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    fn first_action<F>(&mut self, mut visit: F) -> VisitorAction
    where
        F: FnMut(&mut dyn BlockVisitor) -> VisitorAction,
    {
        for visitor in &mut self.visitors {
            let action = visit(visitor.as_mut());
            if action != VisitorAction::Continue {
                return action;
            }
        }
        VisitorAction::Continue
    }
}

impl BlockVisitor for CompositeVisitor {
    fn visit_block(&mut self, block: &Block, depth: usize) -> VisitorAction {
        self.first_action(|v| v.visit_block(block, depth))
    }

    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        self.first_action(|v| v.visit_heading(text, level))
    }

    fn visit_list_item(&mut self, block: &Block, level: usize, ordered: bool) -> VisitorAction {
        self.first_action(|v| v.visit_list_item(block, level, ordered))
    }

    fn visit_code(&mut self, code: &str, language: Option<&str>) -> VisitorAction {
        self.first_action(|v| v.visit_code(code, language))
    }

    fn visit_image(&mut self, source_id: &str, caption: Option<&str>) -> VisitorAction {
        self.first_action(|v| v.visit_image(source_id, caption))
    }

    fn visit_table(&mut self, grid: &TableGrid) -> VisitorAction {
        self.first_action(|v| v.visit_table(grid))
    }

    fn visit_divider(&mut self) -> VisitorAction {
        self.first_action(|v| v.visit_divider())
    }

    fn on_document_start(&mut self, title: &str) {
        for visitor in &mut self.visitors {
            visitor.on_document_start(title);
        }
    }

    fn on_document_end(&mut self) {
        for visitor in &mut self.visitors {
            visitor.on_document_end();
        }
    }
}
