//! Markdown projection of block documents.

use crate::error::Result;
use crate::extract::{BlockWalker, TraversalPolicy, Visit};
use crate::model::{Block, Document, Flavour, PropValue, TableGrid, TextDelta};

use super::visitor::{BlockVisitor, DefaultVisitor, VisitorAction};
use super::{CleanupPipeline, ExtractionStats, MarkdownResult, RenderOptions};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<MarkdownResult> {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<MarkdownResult> {
    let mut options = options.clone();
    options.collect_stats = true;
    MarkdownRenderer::new(options).render(doc)
}

/// Descends everywhere except into the edgeless canvas.
struct MarkdownTraversal;

impl TraversalPolicy for MarkdownTraversal {
    fn descend(&self, block: &Block) -> bool {
        block.flavour != Flavour::Surface
    }
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
    visitor: Box<dyn BlockVisitor>,

    /// Running item numbers, indexed by tree depth
    counters: Vec<u32>,
    /// Depths of the list blocks enclosing the current block
    list_stack: Vec<usize>,
    /// Blocks deeper than this are inside a skipped subtree
    skip_below: Option<usize>,
    /// Whether the last emitted block was a list line
    in_list: bool,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
            visitor: Box::new(DefaultVisitor),
            counters: Vec::new(),
            list_stack: Vec::new(),
            skip_below: None,
            in_list: false,
        }
    }

    /// Use a custom visitor.
    pub fn with_visitor<V: BlockVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitor = Box::new(visitor);
        self
    }

    /// Render a document to Markdown.
    ///
    /// A document without a page block renders to an empty title and an
    /// empty body.
    pub fn render(mut self, doc: &Document) -> Result<MarkdownResult> {
        let roots: Vec<&str> = doc.pages().map(|page| page.id.as_str()).collect();
        if roots.is_empty() {
            log::debug!("Document '{}' has no page block, nothing to render", doc.id);
            return Ok(self.finish(String::new(), String::new()));
        }

        let title = doc.title().unwrap_or_default();
        self.visitor.on_document_start(&title);

        let mut body = String::new();
        for visit in BlockWalker::with_roots(doc, roots, MarkdownTraversal) {
            let Visit { block, depth } = visit?;
            self.render_visit(&mut body, block, depth);
        }

        self.visitor.on_document_end();

        let mut output = String::new();
        if self.options.include_frontmatter {
            output.push_str(&frontmatter(&title));
        }
        output.push_str(body.trim_start_matches('\n').trim_end());
        if !output.is_empty() {
            output.push('\n');
        }

        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        Ok(self.finish(title, output))
    }

    fn finish(mut self, title: String, markdown: String) -> MarkdownResult {
        let stats = if self.options.collect_stats {
            self.stats.count_text(&markdown);
            Some(self.stats)
        } else {
            None
        };
        MarkdownResult {
            title,
            markdown,
            stats,
        }
    }

    fn render_visit(&mut self, output: &mut String, block: &Block, depth: usize) {
        if let Some(skip_depth) = self.skip_below {
            if depth > skip_depth {
                return;
            }
            self.skip_below = None;
        }

        while self.list_stack.last().is_some_and(|&d| d >= depth) {
            self.list_stack.pop();
        }
        self.counters.truncate(depth + 1);
        self.counters.resize(depth + 1, 0);

        if self.options.collect_stats {
            self.stats.block_count += 1;
        }

        match self.visitor.visit_block(block, depth) {
            VisitorAction::Skip => {
                self.skip_below = Some(depth);
                self.counters[depth] = 0;
                return;
            }
            VisitorAction::Replace(content) => {
                self.counters[depth] = 0;
                self.emit(output, block, &content, false);
                return;
            }
            VisitorAction::Continue => {}
        }

        let is_list = block.flavour == Flavour::List;
        if !is_list {
            self.counters[depth] = 0;
        }

        let rendered = self.render_block(block, depth);

        if is_list {
            self.list_stack.push(depth);
        }

        if let Some((content, list_line)) = rendered {
            self.emit(output, block, &content, list_line);
        }
    }

    fn emit(&mut self, output: &mut String, block: &Block, content: &str, list_line: bool) {
        if content.is_empty() {
            return;
        }
        if self.in_list && !list_line {
            output.push('\n');
        }
        if self.options.ai_editable {
            output.push_str(&format!(
                "<!-- block_id={} flavour={} -->\n",
                block.id, block.flavour
            ));
        }
        output.push_str(content);
        self.in_list = list_line;
    }

    /// Render the block's own output and whether it is a list line.
    fn render_block(&mut self, block: &Block, depth: usize) -> Option<(String, bool)> {
        match block.flavour {
            Flavour::Paragraph => self.render_paragraph(block),
            Flavour::List => self.render_list_item(block, depth).map(|s| (s, true)),
            Flavour::Code => self.render_code(block).map(|s| (s, false)),
            Flavour::Image => self.render_image(block).map(|s| (s, false)),
            Flavour::Attachment => self.render_attachment(block).map(|s| (s, false)),
            Flavour::Divider => self.render_divider().map(|s| (s, false)),
            Flavour::Bookmark => self.render_bookmark(block).map(|s| (s, false)),
            Flavour::EmbedLinkedDoc | Flavour::EmbedSyncedDoc => {
                self.render_doc_embed(block).map(|s| (s, false))
            }
            Flavour::Table => self.render_table(block).map(|s| (s, false)),
            Flavour::Latex => render_latex(block).map(|s| (s, false)),
            Flavour::Database => self.render_database(block).map(|s| (s, false)),
            _ => None,
        }
    }

    fn render_paragraph(&mut self, block: &Block) -> Option<(String, bool)> {
        let text = self.render_inline(block.prop("text"));
        if text.trim().is_empty() {
            return None;
        }

        let kind = block.prop_str("type").unwrap_or("text");
        if let Some(level) = heading_level(kind) {
            let level = level.min(self.options.max_heading_level);
            if self.options.collect_stats {
                self.stats.heading_count += 1;
            }
            return match self.visitor.visit_heading(&text, level) {
                VisitorAction::Skip => None,
                VisitorAction::Replace(s) => Some((s, false)),
                VisitorAction::Continue => Some((
                    format!("{} {}\n\n", "#".repeat(level as usize), text),
                    false,
                )),
            };
        }

        if self.options.collect_stats {
            self.stats.paragraph_count += 1;
        }

        if kind == "quote" {
            let quoted: Vec<String> = text.lines().map(|line| format!("> {}", line)).collect();
            return Some((format!("{}\n\n", quoted.join("\n")), false));
        }

        if !self.list_stack.is_empty() {
            let indent = "  ".repeat(self.list_stack.len());
            return Some((format!("{}{}\n", indent, text), true));
        }

        Some((format!("{}\n\n", text), false))
    }

    fn render_list_item(&mut self, block: &Block, depth: usize) -> Option<String> {
        let level = self.list_stack.len();
        let kind = block.prop_str("type").unwrap_or("bulleted");
        let ordered = kind == "numbered";

        let number = if ordered {
            self.counters[depth] += 1;
            self.counters[depth]
        } else {
            self.counters[depth] = 0;
            0
        };

        if self.options.collect_stats {
            self.stats.list_item_count += 1;
        }

        match self.visitor.visit_list_item(block, level, ordered) {
            VisitorAction::Skip => return None,
            VisitorAction::Replace(s) => return Some(s),
            VisitorAction::Continue => {}
        }

        let marker = match kind {
            "numbered" => format!("{}.", number),
            "todo" => {
                let checked = block.prop("checked").and_then(PropValue::as_bool);
                let mark = if checked.unwrap_or(false) { 'x' } else { ' ' };
                format!("{} [{}]", self.options.list_marker, mark)
            }
            _ => self.options.list_marker.to_string(),
        };

        let text = self.render_inline(block.prop("text"));
        let indent = "  ".repeat(level);
        Some(format!("{}{} {}\n", indent, marker, text))
    }

    fn render_code(&mut self, block: &Block) -> Option<String> {
        let code = block.text().unwrap_or_default();
        let language = block.prop_str("language").filter(|l| !l.is_empty());

        if self.options.collect_stats {
            self.stats.code_block_count += 1;
        }

        match self.visitor.visit_code(&code, language) {
            VisitorAction::Skip => None,
            VisitorAction::Replace(s) => Some(s),
            VisitorAction::Continue => Some(format!(
                "```{}\n{}\n```\n\n",
                language.unwrap_or(""),
                code
            )),
        }
    }

    fn render_image(&mut self, block: &Block) -> Option<String> {
        let source_id = block.prop_str("sourceId").filter(|s| !s.is_empty())?;
        let caption = block.props.text("caption").filter(|c| !c.is_empty());

        if self.options.collect_stats {
            self.stats.image_count += 1;
        }

        match self.visitor.visit_image(source_id, caption.as_deref()) {
            VisitorAction::Skip => None,
            VisitorAction::Replace(s) => Some(s),
            VisitorAction::Continue => Some(format!(
                "![{}]({}{})\n\n",
                caption.map(|c| self.escape(&c)).unwrap_or_default(),
                self.options.blob_url_prefix,
                source_id
            )),
        }
    }

    fn render_attachment(&self, block: &Block) -> Option<String> {
        let source_id = block.prop_str("sourceId").filter(|s| !s.is_empty())?;
        let name = block
            .props
            .text("name")
            .filter(|n| !n.is_empty())
            .map(|n| self.escape(&n))
            .unwrap_or_else(|| source_id.to_string());
        Some(format!(
            "[{}]({}{})\n\n",
            name, self.options.blob_url_prefix, source_id
        ))
    }

    fn render_divider(&mut self) -> Option<String> {
        if self.options.collect_stats {
            self.stats.divider_count += 1;
        }
        match self.visitor.visit_divider() {
            VisitorAction::Skip => None,
            VisitorAction::Replace(s) => Some(s),
            VisitorAction::Continue => Some("---\n\n".to_string()),
        }
    }

    fn render_bookmark(&self, block: &Block) -> Option<String> {
        let url = block.prop_str("url").filter(|u| !u.is_empty())?;
        let label = block
            .props
            .text("title")
            .filter(|t| !t.is_empty())
            .map(|t| self.escape(&t))
            .unwrap_or_else(|| url.to_string());
        Some(format!("[{}]({})\n\n", label, url))
    }

    fn render_doc_embed(&mut self, block: &Block) -> Option<String> {
        let page_id = block.prop_str("pageId").filter(|p| !p.is_empty())?;
        let label = block
            .props
            .text("title")
            .filter(|t| !t.is_empty())
            .map(|t| self.escape(&t))
            .unwrap_or_else(|| page_id.to_string());

        if self.options.collect_stats {
            self.stats.doc_link_count += 1;
        }
        Some(format!(
            "[{}]({}{})\n\n",
            label, self.options.doc_link_prefix, page_id
        ))
    }

    fn render_table(&mut self, block: &Block) -> Option<String> {
        let grid = TableGrid::from_block(block);
        if grid.is_empty() {
            return None;
        }

        if self.options.collect_stats {
            self.stats.table_count += 1;
        }

        match self.visitor.visit_table(&grid) {
            VisitorAction::Skip => return None,
            VisitorAction::Replace(s) => return Some(s),
            VisitorAction::Continue => {}
        }

        let mut output = String::new();
        for (i, row) in grid.row_texts().iter().enumerate() {
            output.push('|');
            for cell in row {
                let content = escape_table_cell(cell);
                output.push_str(&format!(" {} |", content.trim()));
            }
            output.push('\n');

            if i == 0 {
                output.push('|');
                output.push_str(&" --- |".repeat(grid.column_count()));
                output.push('\n');
            }
        }
        output.push('\n');
        Some(output)
    }

    fn render_database(&mut self, block: &Block) -> Option<String> {
        let title = block.title().filter(|t| !t.is_empty())?;
        if self.options.collect_stats {
            self.stats.paragraph_count += 1;
        }
        Some(format!("**{}**\n\n", self.escape(&title)))
    }

    fn render_inline(&mut self, value: Option<&PropValue>) -> String {
        match value {
            Some(PropValue::RichText(runs)) => {
                runs.iter().map(|run| self.render_text_run(run)).collect()
            }
            Some(other) => other
                .to_text()
                .map(|text| self.escape(&text))
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn render_text_run(&mut self, run: &TextDelta) -> String {
        if let Some(reference) = run.doc_reference() {
            if self.options.collect_stats {
                self.stats.doc_link_count += 1;
            }
            let label = match run.insert.trim() {
                "" => reference.doc_id.clone(),
                text => self.escape(text),
            };
            return format!(
                "[{}]({}{})",
                label, self.options.doc_link_prefix, reference.doc_id
            );
        }

        if run.insert.trim().is_empty() {
            return run.insert.clone();
        }

        if run.has_flag("code") {
            return format!("`{}`", run.insert);
        }

        let mut result = self.escape(&run.insert);

        // Apply styles (innermost first)
        if run.has_flag("strike") {
            result = format!("~~{}~~", result);
        }
        if run.has_flag("italic") {
            result = format!("*{}*", result);
        }
        if run.has_flag("bold") {
            result = format!("**{}**", result);
        }
        if let Some(url) = run.link() {
            result = format!("[{}]({})", result, url);
        }

        result
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    let level: u8 = kind.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn render_latex(block: &Block) -> Option<String> {
    let latex = block.props.text("latex").filter(|l| !l.trim().is_empty())?;
    Some(format!("$$\n{}\n$$\n\n", latex))
}

fn frontmatter(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("---\ntitle: \"{}\"\n---\n\n", escaped)
}

fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
