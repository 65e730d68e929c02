//! Full block flattening for indexing.
//!
//! Unlike the summary, the crawl covers every stored block, reachable from
//! the page root or not.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::model::{cell_texts, Block, DocReference, Document, Flavour, PropValue};

use super::{summarize, SummaryMode};

/// Indexable facts about one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    /// Block identifier
    pub block_id: String,

    /// Flavour string
    pub flavour: String,

    /// Text content
    pub content: Option<Vec<String>>,

    /// Blob keys (images, attachments)
    pub blob: Option<Vec<String>>,

    /// Referenced document identifiers
    pub ref_doc_id: Option<Vec<String>>,

    /// Reference descriptors as JSON strings, parallel to `ref_doc_id`
    pub ref_info: Option<Vec<String>>,

    /// Flavour of the parent block
    pub parent_flavour: Option<String>,

    /// Identifier of the parent block
    pub parent_block_id: Option<String>,

    /// Extra data as a JSON string
    pub additional: Option<String>,
}

/// Result of crawling a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// One entry per stored block, in stored order
    pub blocks: Vec<BlockInfo>,

    /// Page title (empty without a page block)
    pub title: String,

    /// Bounded summary (empty without a page block)
    pub summary: String,
}

/// A flattened block tagged with its owning document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedBlock {
    /// Owning document identifier
    pub doc_id: String,
    pub block_id: String,
    pub flavour: String,
    pub content: Option<Vec<String>>,
    pub blob: Option<Vec<String>>,
    pub ref_doc_id: Option<Vec<String>>,

    /// Reference descriptors (from `ref_info`)
    #[serde(rename = "ref")]
    pub reference: Option<Vec<String>>,

    pub parent_flavour: Option<String>,
    pub parent_block_id: Option<String>,

    /// Parsed extra data; absent when missing or not valid JSON
    pub additional: Option<Value>,
}

impl IndexedBlock {
    /// Attach a document id to crawled block info.
    ///
    /// An `additional` payload that fails to parse is dropped.
    pub fn from_block_info(doc_id: &str, info: BlockInfo) -> Self {
        let additional = info.additional.and_then(|raw| {
            serde_json::from_str::<Value>(&raw)
                .map_err(|e| {
                    log::debug!(
                        "Dropping unparsable additional data of block '{}': {}",
                        info.block_id,
                        e
                    );
                })
                .ok()
        });

        Self {
            doc_id: doc_id.to_string(),
            block_id: info.block_id,
            flavour: info.flavour,
            content: info.content,
            blob: info.blob,
            ref_doc_id: info.ref_doc_id,
            reference: info.ref_info,
            parent_flavour: info.parent_flavour,
            parent_block_id: info.parent_block_id,
            additional,
        }
    }
}

/// Crawl every block of a document, plus its title and bounded summary.
pub fn crawl(doc: &Document) -> Result<CrawlResult> {
    let content = summarize(doc, SummaryMode::default())?.unwrap_or_default();
    Ok(CrawlResult {
        blocks: crawl_blocks(doc),
        title: content.title,
        summary: content.summary,
    })
}

/// Describe every stored block, in stored order.
pub fn crawl_blocks(doc: &Document) -> Vec<BlockInfo> {
    let parents = doc.parents();
    doc.iter()
        .map(|block| block_info(block, parents.get(block.id.as_str()).copied()))
        .collect()
}

/// Flatten every stored block of a document for indexing.
pub fn flatten(doc: &Document) -> Vec<IndexedBlock> {
    crawl_blocks(doc)
        .into_iter()
        .map(|info| IndexedBlock::from_block_info(&doc.id, info))
        .collect()
}

fn block_info(block: &Block, parent: Option<&Block>) -> BlockInfo {
    let references = doc_references(block);
    let (ref_doc_id, ref_info) = if references.is_empty() {
        (None, None)
    } else {
        (
            Some(references.iter().map(|r| r.doc_id.clone()).collect()),
            Some(references.iter().map(DocReference::to_info_string).collect()),
        )
    };

    BlockInfo {
        block_id: block.id.clone(),
        flavour: block.flavour.to_string(),
        content: non_empty(block_content(block)),
        blob: non_empty(block_blobs(block)),
        ref_doc_id,
        ref_info,
        parent_flavour: parent.map(|p| p.flavour.to_string()),
        parent_block_id: parent.map(|p| p.id.clone()),
        additional: additional(block, parent),
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn props_text(block: &Block, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| block.props.text(key))
        .filter(|text| !text.is_empty())
        .map(|text| text.into_owned())
        .collect()
}

fn block_content(block: &Block) -> Vec<String> {
    match block.flavour {
        Flavour::Page | Flavour::Database | Flavour::EmbedLinkedDoc | Flavour::EmbedSyncedDoc => {
            props_text(block, &["title"])
        }
        Flavour::Paragraph | Flavour::List | Flavour::Code => props_text(block, &["text"]),
        Flavour::Table => cell_texts(block)
            .into_iter()
            .filter(|text| !text.is_empty())
            .map(|text| text.into_owned())
            .collect(),
        Flavour::Image => props_text(block, &["caption"]),
        Flavour::Attachment => props_text(block, &["name"]),
        Flavour::Bookmark => props_text(block, &["title", "description", "url"]),
        Flavour::Latex => props_text(block, &["latex"]),
        _ => Vec::new(),
    }
}

fn block_blobs(block: &Block) -> Vec<String> {
    match block.flavour {
        Flavour::Image | Flavour::Attachment => props_text(block, &["sourceId"]),
        _ => Vec::new(),
    }
}

fn doc_references(block: &Block) -> Vec<DocReference> {
    let mut references: Vec<DocReference> = block
        .props
        .iter()
        .filter_map(|(_, value)| value.as_rich_text())
        .flatten()
        .filter_map(|run| run.doc_reference())
        .collect();

    if block.flavour.is_doc_embed() {
        if let Some(doc_id) = block.prop_str("pageId") {
            references.push(DocReference {
                doc_id: doc_id.to_string(),
                params: block.prop("params").map(PropValue::to_json),
            });
        }
    }

    references
}

fn additional(block: &Block, parent: Option<&Block>) -> Option<String> {
    if let Some(parent) = parent.filter(|p| p.flavour == Flavour::Database) {
        let name = parent.title().map(|t| t.into_owned()).unwrap_or_default();
        return Some(json!({ "databaseName": name }).to_string());
    }
    if block.flavour == Flavour::Note {
        if let Some(mode) = block.prop_str("displayMode") {
            return Some(json!({ "displayMode": mode }).to_string());
        }
    }
    None
}
