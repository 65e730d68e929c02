//! Integration tests for page title and summary extraction.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

use blocktext::{parse_page, DecodeOptions, Error, Extractor, SummaryMode};

fn snapshot(value: Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn page_with(children: &[&str], blocks: Value) -> Vec<u8> {
    let mut all = json!({
        "root": {
            "sys:flavour": "affine:page",
            "sys:children": children,
            "prop:title": "Weekly notes"
        }
    });
    if let (Some(map), Value::Object(extra)) = (all.as_object_mut(), blocks) {
        map.extend(extra);
    }
    snapshot(json!({ "blocks": all }))
}

fn paragraph(text: &str) -> Value {
    json!({ "sys:flavour": "affine:paragraph", "prop:type": "text", "prop:text": text })
}

#[test]
fn test_soft_bound_keeps_first_overrun() {
    let data = page_with(&["a", "b"], json!({ "a": paragraph("AB"), "b": paragraph("CD") }));

    let page = parse_page(&data, SummaryMode::from_max_length(1))
        .unwrap()
        .unwrap();
    assert_eq!(page.title, "Weekly notes");
    assert_eq!(page.summary, "AB");
}

#[test]
fn test_unbounded_never_yields_less() {
    let data = page_with(
        &["n"],
        json!({
            "n": { "sys:flavour": "affine:note", "sys:children": ["a", "b", "c"] },
            "a": paragraph("first paragraph "),
            "b": paragraph("second paragraph "),
            "c": paragraph("third paragraph"),
        }),
    );

    let full = parse_page(&data, SummaryMode::from_max_length(-1))
        .unwrap()
        .unwrap();
    for bound in [0, 1, 5, 20, 40, 1000] {
        let bounded = parse_page(&data, SummaryMode::from_max_length(bound))
            .unwrap()
            .unwrap();
        assert!(full.summary.len() >= bounded.summary.len(), "bound {}", bound);
        assert!(full.summary.starts_with(&bounded.summary));
    }
}

#[test]
fn test_negative_length_other_than_sentinel_is_empty() {
    let data = page_with(&["a"], json!({ "a": paragraph("text") }));
    let page = parse_page(&data, SummaryMode::from_max_length(-7))
        .unwrap()
        .unwrap();
    assert_eq!(page.summary, "");
}

#[test]
fn test_table_cells_joined_with_pipe() {
    let data = page_with(
        &["t"],
        json!({
            "t": {
                "sys:flavour": "affine:table",
                "prop:cells.r1:c1.text": "x",
                "prop:cells.r1:c2.text": "y"
            }
        }),
    );

    let full = parse_page(&data, SummaryMode::Unbounded).unwrap().unwrap();
    assert!(full.summary == "x|y" || full.summary == "y|x");

    let bounded = parse_page(&data, SummaryMode::default()).unwrap().unwrap();
    assert_eq!(bounded.summary, "");
}

#[test]
fn test_no_page_block_is_absent() {
    let data = snapshot(json!({ "blocks": { "p": paragraph("loose") } }));
    assert!(parse_page(&data, SummaryMode::Unbounded).unwrap().is_none());

    let empty = snapshot(json!({ "blocks": {} }));
    assert!(parse_page(&empty, SummaryMode::Unbounded).unwrap().is_none());
}

#[test]
fn test_unknown_flavour_is_not_entered() {
    let data = page_with(
        &["x", "a"],
        json!({
            "x": { "sys:flavour": "vendor:widget", "sys:children": ["hidden"] },
            "hidden": paragraph("hidden"),
            "a": paragraph("visible"),
        }),
    );
    let page = parse_page(&data, SummaryMode::Unbounded).unwrap().unwrap();
    assert_eq!(page.summary, "visible");
}

#[test]
fn test_dangling_child_stops_walk() {
    let data = page_with(
        &["a", "ghost", "b"],
        json!({ "a": paragraph("kept"), "b": paragraph("dropped") }),
    );
    let page = parse_page(&data, SummaryMode::Unbounded).unwrap().unwrap();
    assert_eq!(page.summary, "kept");
}

#[test]
fn test_cycle_is_reported() {
    let data = page_with(
        &["n"],
        json!({ "n": { "sys:flavour": "affine:note", "sys:children": ["n"] } }),
    );
    let result = parse_page(&data, SummaryMode::Unbounded);
    assert!(matches!(
        result,
        Err(Error::CyclicReference { ref block_id }) if block_id == "n"
    ));
}

#[test]
fn test_shared_child_is_reported() {
    let data = page_with(
        &["n1", "n2"],
        json!({
            "n1": { "sys:flavour": "affine:note", "sys:children": ["p"] },
            "n2": { "sys:flavour": "affine:note", "sys:children": ["p"] },
            "p": paragraph("shared"),
        }),
    );
    assert!(parse_page(&data, SummaryMode::Unbounded).is_err());
}

#[test]
fn test_multiple_pages_last_title_wins() {
    let data = snapshot(json!({
        "blocks": {
            "p1": { "sys:flavour": "affine:page", "sys:children": ["a"], "prop:title": "First" },
            "a": paragraph("one "),
            "p2": { "sys:flavour": "affine:page", "sys:children": ["b"], "prop:title": "Second" },
            "b": paragraph("two"),
        }
    }));
    let page = parse_page(&data, SummaryMode::Unbounded).unwrap().unwrap();
    assert_eq!(page.title, "Second");
    assert_eq!(page.summary, "one two");
}

#[test]
fn test_gzip_snapshot() {
    let data = page_with(&["a"], json!({ "a": paragraph("compressed") }));
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data).unwrap();
    let gz = encoder.finish().unwrap();

    let page = parse_page(&gz, SummaryMode::default()).unwrap().unwrap();
    assert_eq!(page.summary, "compressed");
}

#[test]
fn test_malformed_block_strict_and_lenient() {
    let data = page_with(
        &["a"],
        json!({ "a": paragraph("fine"), "bad": { "sys:children": [] } }),
    );

    let strict = parse_page(&data, SummaryMode::default());
    assert!(strict.unwrap_err().is_decode_error());

    let lenient = Extractor::new()
        .with_decode_options(DecodeOptions::new().lenient())
        .load("doc", &data)
        .unwrap()
        .summary()
        .unwrap()
        .unwrap();
    assert_eq!(lenient.summary, "fine");
}

#[test]
fn test_deep_nesting() {
    let depth = 20_000;
    let mut blocks = serde_json::Map::new();
    blocks.insert(
        "root".to_string(),
        json!({ "sys:flavour": "affine:page", "sys:children": ["l0"], "prop:title": "Deep" }),
    );
    for i in 0..depth {
        let children: Vec<String> = if i + 1 < depth {
            vec![format!("l{}", i + 1)]
        } else {
            Vec::new()
        };
        blocks.insert(
            format!("l{}", i),
            json!({ "sys:flavour": "affine:list", "sys:children": children, "prop:text": "x" }),
        );
    }
    let data = snapshot(json!({ "blocks": blocks }));

    let page = parse_page(&data, SummaryMode::Unbounded).unwrap().unwrap();
    assert_eq!(page.summary.len(), depth);
}
