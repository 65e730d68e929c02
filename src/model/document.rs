//! Document-level types.

use super::{Block, Flavour};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A decoded block-tree document.
///
/// Blocks are kept in an arena in stored order with an identifier index on
/// the side. A document is read-only for extraction; nothing in this crate
/// mutates it after decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    /// Identifier of the document (may be empty when unknown)
    pub id: String,

    /// Blocks in stored order
    blocks: Vec<Block>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    id: String,
    #[serde(default)]
    blocks: Vec<Block>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Document::from_blocks(raw.id, raw.blocks)
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            blocks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a document from blocks in stored order.
    pub fn from_blocks(id: impl Into<String>, blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut doc = Self::new(id);
        for block in blocks {
            doc.insert(block);
        }
        doc
    }

    /// Add a block. A block with an existing identifier replaces the old one
    /// in place.
    pub fn insert(&mut self, block: Block) {
        match self.index.get(&block.id) {
            Some(&pos) => self.blocks[pos] = block,
            None => {
                self.index.insert(block.id.clone(), self.blocks.len());
                self.blocks.push(block);
            }
        }
    }

    /// Look up a block by identifier.
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.index.get(id).map(|&pos| &self.blocks[pos])
    }

    /// Check whether a block exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ordered child identifiers of a block.
    pub fn children_of(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|b| b.children.as_slice())
    }

    /// Iterate over all blocks in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// All blocks in stored order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks whose flavour is page, in stored order.
    pub fn pages(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.flavour == Flavour::Page)
    }

    /// Document title: title of the last page block.
    ///
    /// `None` when the document has no page block.
    pub fn title(&self) -> Option<String> {
        self.pages()
            .last()
            .map(|page| page.title().map(|t| t.into_owned()).unwrap_or_default())
    }

    /// Map each child identifier to its parent block.
    ///
    /// When a block is listed under several parents the first one in stored
    /// order wins.
    pub fn parents(&self) -> HashMap<&str, &Block> {
        let mut parents = HashMap::new();
        for block in &self.blocks {
            for child in &block.children {
                parents.entry(child.as_str()).or_insert(block);
            }
        }
        parents
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
