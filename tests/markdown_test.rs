//! Integration tests for Markdown projection and the visitor pattern.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use blocktext::model::{Block, Flavour, TableGrid};
use blocktext::render::visitor::{
    BlockVisitor, CompositeVisitor, DefaultVisitor, MaxHeadingDepthVisitor, SkipImagesVisitor,
    VisitorAction,
};
use blocktext::render::{to_json, CleanupPreset, JsonFormat, RenderOptions};
use blocktext::{project_markdown, Extractor};

fn snapshot() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "blocks": {
            "root": {
                "sys:flavour": "affine:page",
                "sys:children": ["note"],
                "prop:title": "Release \"notes\""
            },
            "note": {
                "sys:flavour": "affine:note",
                "sys:children": ["h", "intro", "img", "steps", "div", "quote"]
            },
            "h": { "sys:flavour": "affine:paragraph", "prop:type": "h1", "prop:text": "Overview" },
            "intro": {
                "sys:flavour": "affine:paragraph",
                "prop:type": "text",
                "prop:text": [
                    { "insert": "Ships " },
                    { "insert": "today", "attributes": { "italic": true } }
                ]
            },
            "img": {
                "sys:flavour": "affine:image",
                "prop:sourceId": "shot",
                "prop:caption": "Screenshot"
            },
            "steps": {
                "sys:flavour": "affine:list",
                "sys:children": ["sub"],
                "prop:type": "numbered",
                "prop:text": "Build"
            },
            "sub": { "sys:flavour": "affine:list", "prop:type": "bulleted", "prop:text": "cargo" },
            "div": { "sys:flavour": "affine:divider" },
            "quote": { "sys:flavour": "affine:paragraph", "prop:type": "quote", "prop:text": "Done" }
        }
    }))
    .unwrap()
}

/// Custom visitor that tracks visit counts.
#[derive(Default, Clone)]
struct CountingVisitor {
    blocks: Arc<AtomicUsize>,
    headings: Arc<AtomicUsize>,
    list_items: Arc<AtomicUsize>,
    images: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl BlockVisitor for CountingVisitor {
    fn visit_block(&mut self, _block: &Block, _depth: usize) -> VisitorAction {
        self.blocks.fetch_add(1, Ordering::SeqCst);
        VisitorAction::Continue
    }

    fn visit_heading(&mut self, _text: &str, _level: u8) -> VisitorAction {
        self.headings.fetch_add(1, Ordering::SeqCst);
        VisitorAction::Continue
    }

    fn visit_list_item(&mut self, _block: &Block, _level: usize, _ordered: bool) -> VisitorAction {
        self.list_items.fetch_add(1, Ordering::SeqCst);
        VisitorAction::Continue
    }

    fn visit_image(&mut self, _source_id: &str, _caption: Option<&str>) -> VisitorAction {
        self.images.fetch_add(1, Ordering::SeqCst);
        VisitorAction::Continue
    }

    fn on_document_start(&mut self, _title: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
}

/// Drops list blocks and everything below them.
struct SkipLists;

impl BlockVisitor for SkipLists {
    fn visit_block(&mut self, block: &Block, _depth: usize) -> VisitorAction {
        if block.flavour == Flavour::List {
            VisitorAction::Skip
        } else {
            VisitorAction::Continue
        }
    }
}

#[test]
fn test_project_markdown() {
    let result = project_markdown("doc", &snapshot(), false).unwrap();
    assert_eq!(result.title, "Release \"notes\"");
    assert_eq!(
        result.markdown,
        "# Overview\n\n\
         Ships *today*\n\n\
         ![Screenshot](blob://shot)\n\n\
         1. Build\n  - cargo\n\n\
         ---\n\n\
         > Done\n"
    );
}

#[test]
fn test_ai_editable_marks_every_rendered_block() {
    let result = project_markdown("doc", &snapshot(), true).unwrap();
    let markers = result.markdown.matches("<!-- block_id=").count();
    assert_eq!(markers, 7);
    assert!(result
        .markdown
        .starts_with("<!-- block_id=h flavour=affine:paragraph -->\n# Overview"));
    assert!(result
        .markdown
        .contains("<!-- block_id=sub flavour=affine:list -->\n  - cargo"));
}

#[test]
fn test_no_page_gives_empty_projection() {
    let data = serde_json::to_vec(&json!({
        "blocks": { "p": { "sys:flavour": "affine:paragraph", "prop:text": "x" } }
    }))
    .unwrap();
    let result = project_markdown("doc", &data, true).unwrap();
    assert_eq!(result.title, "");
    assert_eq!(result.markdown, "");
}

#[test]
fn test_frontmatter_escapes_title() {
    let loaded = Extractor::new()
        .with_frontmatter()
        .load("doc", &snapshot())
        .unwrap();
    let result = loaded.markdown().unwrap();
    assert!(result
        .markdown
        .starts_with("---\ntitle: \"Release \\\"notes\\\"\"\n---\n\n# Overview"));
}

#[test]
fn test_cleanup_applied() {
    let data = serde_json::to_vec(&json!({
        "blocks": {
            "root": { "sys:flavour": "affine:page", "sys:children": ["p"], "prop:title": "T" },
            "p": { "sys:flavour": "affine:paragraph", "prop:text": "cafe\u{0301}\u{200B}  " }
        }
    }))
    .unwrap();
    let result = Extractor::new()
        .with_cleanup(CleanupPreset::Standard)
        .load("doc", &data)
        .unwrap()
        .markdown()
        .unwrap();
    assert_eq!(result.markdown, "caf\u{00E9}\n");
}

#[test]
fn test_counting_visitor_through_composite() {
    let counter = CountingVisitor::default();
    let loaded = Extractor::new().load("doc", &snapshot()).unwrap();
    let result = loaded
        .markdown_with_visitor(
            CompositeVisitor::new()
                .with_visitor(DefaultVisitor::new())
                .with_visitor(counter.clone()),
        )
        .unwrap();

    assert!(result.markdown.contains("# Overview"));
    assert_eq!(counter.blocks.load(Ordering::SeqCst), 9);
    assert_eq!(counter.headings.load(Ordering::SeqCst), 1);
    assert_eq!(counter.list_items.load(Ordering::SeqCst), 2);
    assert_eq!(counter.images.load(Ordering::SeqCst), 1);
    assert_eq!(counter.started.load(Ordering::SeqCst), 1);
}

#[test]
fn test_markdown_result_to_json() {
    let result = project_markdown("doc", &snapshot(), false).unwrap();
    let json = to_json(&result, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "Release \"notes\"");
    assert!(value["markdown"].as_str().unwrap().starts_with("# Overview"));
    assert!(value.get("stats").is_none());
}

#[test]
fn test_skip_images_visitor() {
    let loaded = Extractor::new().load("doc", &snapshot()).unwrap();
    let result = loaded.markdown_with_visitor(SkipImagesVisitor).unwrap();
    assert!(!result.markdown.contains("!["));
    assert!(result.markdown.contains("Ships *today*"));
}

#[test]
fn test_skip_subtree_visitor() {
    let loaded = Extractor::new().load("doc", &snapshot()).unwrap();
    let result = loaded.markdown_with_visitor(SkipLists).unwrap();
    assert!(!result.markdown.contains("Build"));
    assert!(!result.markdown.contains("cargo"));
    assert!(result.markdown.contains("---"));
}

#[test]
fn test_max_heading_depth_visitor() {
    let data = serde_json::to_vec(&json!({
        "blocks": {
            "root": { "sys:flavour": "affine:page", "sys:children": ["h"], "prop:title": "T" },
            "h": { "sys:flavour": "affine:paragraph", "prop:type": "h5", "prop:text": "Deep" }
        }
    }))
    .unwrap();
    let loaded = Extractor::new().load("doc", &data).unwrap();
    let result = loaded
        .markdown_with_visitor(MaxHeadingDepthVisitor::new(2))
        .unwrap();
    assert_eq!(result.markdown, "## Deep\n");
}

#[test]
fn test_table_visitor_replacement() {
    struct OmitTables;
    impl BlockVisitor for OmitTables {
        fn visit_table(&mut self, grid: &TableGrid) -> VisitorAction {
            VisitorAction::Replace(format!("[table {}x{}]\n\n", grid.row_count(), grid.column_count()))
        }
    }

    let data = serde_json::to_vec(&json!({
        "blocks": {
            "root": { "sys:flavour": "affine:page", "sys:children": ["t"], "prop:title": "T" },
            "t": {
                "sys:flavour": "affine:table",
                "prop:cells.r1:c1.text": "a",
                "prop:cells.r1:c2.text": "b",
                "prop:cells.r2:c1.text": "c",
                "prop:cells.r2:c2.text": "d"
            }
        }
    }))
    .unwrap();
    let loaded = Extractor::new().load("doc", &data).unwrap();
    let result = loaded.markdown_with_visitor(OmitTables).unwrap();
    assert_eq!(result.markdown, "[table 2x2]\n");
}

#[test]
fn test_stats_collection() {
    let result = Extractor::new()
        .with_render_options(RenderOptions::new().with_stats(true))
        .load("doc", &snapshot())
        .unwrap()
        .markdown()
        .unwrap();
    let stats = result.stats.unwrap();
    assert_eq!(stats.block_count, 9);
    assert_eq!(stats.heading_count, 1);
    assert_eq!(stats.list_item_count, 2);
    assert_eq!(stats.image_count, 1);
    assert_eq!(stats.divider_count, 1);
}
