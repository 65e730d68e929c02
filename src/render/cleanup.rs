//! Text cleanup pipeline for rendered Markdown.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: Unicode NFC normalization only
    Minimal,
    /// Standard cleanup: NFC + invisible characters + line cleanup
    #[default]
    Standard,
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Remove zero-width characters left behind by collaborative editing
    pub remove_zero_width: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Trim trailing whitespace on every line
    pub trim_trailing_whitespace: bool,

    /// Maximum consecutive blank lines (0 = unlimited)
    pub max_blank_lines: u8,

    /// Leave YAML frontmatter untouched
    pub preserve_frontmatter: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            remove_zero_width: false,
            remove_replacement_char: false,
            trim_trailing_whitespace: false,
            max_blank_lines: 0,
            preserve_frontmatter: true,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            remove_zero_width: true,
            remove_replacement_char: true,
            trim_trailing_whitespace: true,
            max_blank_lines: 1,
            preserve_frontmatter: true,
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

fn zero_width_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}]").unwrap())
}

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A---\n.*?\n---\n").unwrap())
}

/// Text cleanup pipeline.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        if self.options.preserve_frontmatter {
            if let Some(m) = frontmatter_regex().find(text) {
                let body = self.process_content(&text[m.end()..]);
                return format!("{}{}", m.as_str(), body);
            }
        }
        self.process_content(text)
    }

    fn process_content(&self, text: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.options.remove_zero_width {
            result = zero_width_regex().replace_all(&result, "").into_owned();
        }

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        if self.options.trim_trailing_whitespace || self.options.max_blank_lines > 0 {
            result = self.clean_lines(&result);
        }

        result
    }

    fn clean_lines(&self, text: &str) -> String {
        let max_blank = usize::from(self.options.max_blank_lines);
        let mut out = String::with_capacity(text.len());
        let mut blank_run = 0usize;

        for line in text.split('\n') {
            let line = if self.options.trim_trailing_whitespace {
                line.trim_end()
            } else {
                line
            };

            if line.trim().is_empty() {
                blank_run += 1;
                if max_blank > 0 && blank_run > max_blank {
                    continue;
                }
            } else {
                blank_run = 0;
            }

            out.push_str(line);
            out.push('\n');
        }

        // split yields one segment more than there are separators
        out.pop();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_normalization() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        let text = "cafe\u{0301}";
        let result = pipeline.process(text);
        assert_eq!(result, "caf\u{00E9}");
    }

    #[test]
    fn test_remove_invisible_chars() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        let result = pipeline.process("Hel\u{200B}lo\u{FFFD} World");
        assert_eq!(result, "Hello World");
    }

    #[test]
    fn test_trailing_whitespace_and_blank_lines() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        let result = pipeline.process("# Title  \n\n\n\nBody\t\n");
        assert_eq!(result, "# Title\n\nBody\n");
    }

    #[test]
    fn test_minimal_keeps_layout() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        let text = "a  \n\n\n\nb";
        assert_eq!(pipeline.process(text), text);
    }

    #[test]
    fn test_frontmatter_preservation() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        let text = "---\ntitle: \"Test\"   \n---\n\n\n\nContent   ";
        let result = pipeline.process(text);
        assert!(result.starts_with("---\ntitle: \"Test\"   \n---\n"));
        assert!(result.ends_with("\n\nContent"));
    }
}
