//! Table block helpers.
//!
//! Table blocks keep their content flat in the property bag:
//! `cells.<row>:<column>.text` for cell text and `rows.<row>.order` /
//! `columns.<column>.order` for ordering.

use super::Block;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

fn cell_text_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^cells\.([^.:]+):([^.]+)\.text$").unwrap())
}

fn any_cell_text_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^cells\.[^.]+\.text$").unwrap())
}

fn order_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(rows|columns)\.([^.]+)\.order$").unwrap())
}

/// Text of every cell in the order the property bag stores them.
pub fn cell_texts(block: &Block) -> Vec<Cow<'_, str>> {
    block
        .props
        .iter()
        .filter(|(key, _)| any_cell_text_key().is_match(key))
        .map(|(_, value)| value.to_text().unwrap_or_default())
        .collect()
}

/// A table block laid out as a grid.
#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    /// Row identifiers in display order
    pub rows: Vec<String>,

    /// Column identifiers in display order
    pub columns: Vec<String>,

    cells: HashMap<(String, String), String>,
}

impl TableGrid {
    /// Build a grid from a table block.
    ///
    /// Rows and columns without explicit order entries are taken from the
    /// cell keys in first-seen order.
    pub fn from_block(block: &Block) -> Self {
        let mut row_order: Vec<(String, String)> = Vec::new();
        let mut column_order: Vec<(String, String)> = Vec::new();
        let mut seen_rows: Vec<String> = Vec::new();
        let mut seen_columns: Vec<String> = Vec::new();
        let mut cells = HashMap::new();

        for (key, value) in block.props.iter() {
            if let Some(caps) = cell_text_key().captures(key) {
                let row = caps[1].to_string();
                let column = caps[2].to_string();
                if !seen_rows.contains(&row) {
                    seen_rows.push(row.clone());
                }
                if !seen_columns.contains(&column) {
                    seen_columns.push(column.clone());
                }
                let text = value.to_text().unwrap_or_default().into_owned();
                cells.insert((row, column), text);
            } else if let Some(caps) = order_key().captures(key) {
                let order = value.to_text().unwrap_or_default().into_owned();
                let entry = (order, caps[2].to_string());
                if &caps[1] == "rows" {
                    row_order.push(entry);
                } else {
                    column_order.push(entry);
                }
            }
        }

        Self {
            rows: ordered(row_order, seen_rows),
            columns: ordered(column_order, seen_columns),
            cells,
        }
    }

    /// Get the text of a cell.
    pub fn cell(&self, row: &str, column: &str) -> Option<&str> {
        self.cells
            .get(&(row.to_string(), column.to_string()))
            .map(String::as_str)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the grid has no cells to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Cell texts row by row; missing cells are empty strings.
    pub fn row_texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| self.cell(row, column).unwrap_or(""))
                    .collect()
            })
            .collect()
    }
}

fn ordered(mut explicit: Vec<(String, String)>, seen: Vec<String>) -> Vec<String> {
    if explicit.is_empty() {
        return seen;
    }
    explicit.sort();
    let mut ids: Vec<String> = explicit.into_iter().map(|(_, id)| id).collect();
    for id in seen {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
