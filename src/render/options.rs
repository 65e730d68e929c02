//! Rendering options and configuration.

use super::CleanupOptions;

/// Options for rendering a document as Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit a `<!-- block_id=.. flavour=.. -->` comment before each block
    pub ai_editable: bool,

    /// Include YAML frontmatter with the title
    pub include_frontmatter: bool,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters in text runs
    pub escape_special_chars: bool,

    /// Prefix for blob links (images, attachments)
    pub blob_url_prefix: String,

    /// Prefix for links to other documents
    pub doc_link_prefix: String,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable block identity comments.
    pub fn with_ai_editable(mut self, enabled: bool) -> Self {
        self.ai_editable = enabled;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable escaping of Markdown characters.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the blob link prefix.
    pub fn with_blob_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blob_url_prefix = prefix.into();
        self
    }

    /// Set the document link prefix.
    pub fn with_doc_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.doc_link_prefix = prefix.into();
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ai_editable: false,
            include_frontmatter: false,
            max_heading_level: 6,
            list_marker: '-',
            escape_special_chars: false,
            blob_url_prefix: "blob://".to_string(),
            doc_link_prefix: "doc://".to_string(),
            cleanup: None,
            collect_stats: false,
        }
    }
}
