//! Decoder for materialized JSON snapshots.

use serde_json::{Map, Value};

use crate::detect::json_payload;
use crate::error::{Error, Result};
use crate::model::{Block, Document, Flavour, PropValue, Properties, WorkspaceMeta, WorkspaceRoot};

use super::options::{DecodeOptions, ErrorMode};
use super::SnapshotDecoder;

const META_REGION: &str = "meta";
const BLOCKS_REGION: &str = "blocks";
const SYS_ID: &str = "sys:id";
const SYS_FLAVOUR: &str = "sys:flavour";
const SYS_CHILDREN: &str = "sys:children";
const PROP_PREFIX: &str = "prop:";

/// Decoder for the JSON form of a replicated document.
///
/// Accepts plain or gzip-compressed JSON with optional `meta` and `blocks`
/// regions. Block entries map `sys:*` keys to structure and `prop:*` keys to
/// the property bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotDecoder;

impl JsonSnapshotDecoder {
    /// Create a JSON snapshot decoder.
    pub fn new() -> Self {
        Self
    }

    fn parse_regions(&self, bytes: &[u8]) -> Result<Map<String, Value>> {
        let payload = json_payload(bytes)?;
        match serde_json::from_slice::<Value>(&payload)? {
            Value::Object(regions) => Ok(regions),
            _ => Err(Error::Decode("snapshot root is not a map".to_string())),
        }
    }

    fn decode_meta(&self, value: Value, options: &DecodeOptions) -> Result<Option<WorkspaceMeta>> {
        match serde_json::from_value::<WorkspaceMeta>(value) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("Ignoring unreadable meta region: {}", e);
                Ok(None)
            }
            Err(e) => Err(Error::Decode(format!("meta region: {}", e))),
        }
    }

    /// Decode the block map.
    ///
    /// Every stored entry becomes its own block; an entry whose `sys:id`
    /// repeats an earlier one is malformed.
    fn decode_blocks(&self, value: Value, options: &DecodeOptions) -> Result<Document> {
        let Value::Object(entries) = value else {
            return Err(Error::Decode("blocks region is not a map".to_string()));
        };

        let mut doc = Document::new(String::new());
        for (key, entry) in entries {
            let decoded = decode_block(&key, entry).and_then(|block| {
                if doc.contains(&block.id) {
                    Err(malformed(&key, format!("duplicate sys:id '{}'", block.id)))
                } else {
                    Ok(block)
                }
            });
            match decoded {
                Ok(block) => doc.insert(block),
                Err(e) if options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping block: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!("Decoded {} blocks", doc.len());
        Ok(doc)
    }
}

impl SnapshotDecoder for JsonSnapshotDecoder {
    fn name(&self) -> &str {
        "json"
    }

    fn decode_workspace_root(
        &self,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> Result<WorkspaceRoot> {
        let mut regions = self.parse_regions(bytes)?;

        let meta = match regions.remove(META_REGION) {
            Some(value) => self.decode_meta(value, options)?,
            None => None,
        };
        let blocks = match regions.remove(BLOCKS_REGION) {
            Some(value) => Some(self.decode_blocks(value, options)?),
            None => None,
        };

        Ok(WorkspaceRoot { meta, blocks })
    }
}

fn malformed(block_id: &str, reason: impl Into<String>) -> Error {
    Error::MalformedBlock {
        block_id: block_id.to_string(),
        reason: reason.into(),
    }
}

fn decode_block(key: &str, entry: Value) -> Result<Block> {
    let Value::Object(fields) = entry else {
        return Err(malformed(key, "entry is not a map"));
    };

    let mut id = None;
    let mut flavour = None;
    let mut children = Vec::new();
    let mut props = Properties::new();

    for (name, value) in fields {
        match name.as_str() {
            SYS_ID => match value {
                Value::String(s) => id = Some(s),
                _ => return Err(malformed(key, "sys:id is not a string")),
            },
            SYS_FLAVOUR => match value {
                Value::String(s) => flavour = Some(Flavour::parse(&s)),
                _ => return Err(malformed(key, "sys:flavour is not a string")),
            },
            SYS_CHILDREN => children = decode_children(key, value)?,
            _ => {
                if let Some(prop) = name.strip_prefix(PROP_PREFIX) {
                    props.insert(prop, PropValue::from_json(value));
                }
            }
        }
    }

    let flavour = flavour.ok_or_else(|| malformed(key, "missing sys:flavour"))?;
    Ok(Block {
        id: id.unwrap_or_else(|| key.to_string()),
        flavour,
        children,
        props,
    })
}

fn decode_children(key: &str, value: Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(malformed(key, "sys:children holds a non-string entry")),
            })
            .collect(),
        _ => Err(malformed(key, "sys:children is not a list")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn strict() -> DecodeOptions {
        DecodeOptions::default()
    }

    #[test]
    fn test_decode_blocks() {
        let data = bytes(json!({
            "blocks": {
                "root": {
                    "sys:id": "root",
                    "sys:flavour": "affine:page",
                    "sys:version": 2,
                    "sys:children": ["p1"],
                    "prop:title": "Hello"
                },
                "p1": {
                    "sys:flavour": "affine:paragraph",
                    "prop:type": "text",
                    "prop:text": [{"insert": "World"}]
                }
            }
        }));

        let doc = JsonSnapshotDecoder::new()
            .decode_document(&data, "doc", &strict())
            .unwrap();
        assert_eq!(doc.id, "doc");
        assert_eq!(doc.len(), 2);

        let root = doc.get("root").unwrap();
        assert_eq!(root.flavour, Flavour::Page);
        assert_eq!(root.children, vec!["p1".to_string()]);
        assert_eq!(root.props.len(), 1);

        let p1 = doc.get("p1").unwrap();
        assert_eq!(p1.text().unwrap(), "World");
        assert_eq!(p1.prop_str("type"), Some("text"));
    }

    #[test]
    fn test_regions() {
        let decoder = JsonSnapshotDecoder::new();

        let root = decoder
            .decode_workspace_root(&bytes(json!({"meta": {"name": "W"}})), &strict())
            .unwrap();
        assert!(root.has_meta_region());
        assert!(!root.has_blocks_region());

        let root = decoder
            .decode_workspace_root(&bytes(json!({"blocks": {}})), &strict())
            .unwrap();
        assert!(!root.has_meta_region());
        assert!(root.blocks.unwrap().is_empty());
    }

    #[test]
    fn test_missing_flavour_strict() {
        let data = bytes(json!({"blocks": {"x": {"sys:children": []}}}));
        let result = JsonSnapshotDecoder::new().decode_document(&data, "doc", &strict());
        assert!(matches!(result, Err(Error::MalformedBlock { ref block_id, .. }) if block_id == "x"));
    }

    #[test]
    fn test_malformed_block_lenient() {
        let data = bytes(json!({
            "blocks": {
                "bad": {"sys:flavour": "affine:list", "sys:children": [1, 2]},
                "good": {"sys:flavour": "affine:paragraph"}
            }
        }));

        let lenient = DecodeOptions::new().lenient();
        let doc = JsonSnapshotDecoder::new()
            .decode_document(&data, "doc", &lenient)
            .unwrap();
        assert_eq!(doc.len(), 1);
        assert!(doc.contains("good"));
    }

    #[test]
    fn test_invalid_json() {
        let result = JsonSnapshotDecoder::new().decode_workspace_root(b"{\"blocks\": [}", &strict());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_blocks_region_not_a_map() {
        let result = JsonSnapshotDecoder::new()
            .decode_workspace_root(&bytes(json!({"blocks": 3})), &strict());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_referenced_doc_ids_respects_trash() {
        let data = bytes(json!({
            "meta": {"pages": [{"id": "a"}, {"id": "b", "trash": true}]}
        }));

        let decoder = JsonSnapshotDecoder::new();
        let all = decoder.referenced_doc_ids(&data, &strict()).unwrap();
        assert_eq!(all, vec!["a", "b"]);

        let without_trash = DecodeOptions::new().without_trash();
        assert_eq!(
            decoder.referenced_doc_ids(&data, &without_trash).unwrap(),
            vec!["a"]
        );
    }

    #[test]
    fn test_duplicate_id_strict() {
        let data = bytes(json!({
            "blocks": {
                "a": {"sys:id": "x", "sys:flavour": "affine:paragraph", "prop:text": "one"},
                "b": {"sys:id": "x", "sys:flavour": "affine:paragraph", "prop:text": "two"}
            }
        }));
        let result = JsonSnapshotDecoder::new().decode_document(&data, "doc", &strict());
        assert!(matches!(result, Err(Error::MalformedBlock { ref block_id, .. }) if block_id == "b"));
    }

    #[test]
    fn test_duplicate_id_lenient_keeps_first() {
        let data = bytes(json!({
            "blocks": {
                "a": {"sys:id": "x", "sys:flavour": "affine:paragraph", "prop:text": "one"},
                "b": {"sys:id": "x", "sys:flavour": "affine:paragraph", "prop:text": "two"},
                "c": {"sys:flavour": "affine:paragraph", "prop:text": "three"}
            }
        }));
        let lenient = DecodeOptions::new().lenient();
        let doc = JsonSnapshotDecoder::new()
            .decode_document(&data, "doc", &lenient)
            .unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("x").unwrap().text().unwrap(), "one");
    }
}
