//! Per-flavour extraction rules.

use std::borrow::Cow;

use crate::model::{cell_texts, Block, Flavour};

use super::walker::TraversalPolicy;

/// Default summary length in characters.
pub const DEFAULT_SUMMARY_LENGTH: usize = 150;

/// Length value that requests unbounded extraction.
pub const UNBOUNDED_LENGTH: i64 = -1;

/// Separator between table cell texts.
pub const TABLE_CELL_SEPARATOR: &str = "|";

/// Extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    /// Summary bounded to roughly this many characters
    Bounded(usize),
    /// Full content, no truncation
    Unbounded,
}

impl SummaryMode {
    /// Interpret a signed maximum length.
    ///
    /// `-1` means unbounded. Any other negative length is a bounded budget
    /// that is already used up.
    pub fn from_max_length(max_length: i64) -> Self {
        match max_length {
            UNBOUNDED_LENGTH => SummaryMode::Unbounded,
            n if n < 0 => SummaryMode::Bounded(0),
            n => SummaryMode::Bounded(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Check whether this mode disables truncation.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, SummaryMode::Unbounded)
    }
}

impl Default for SummaryMode {
    fn default() -> Self {
        SummaryMode::Bounded(DEFAULT_SUMMARY_LENGTH)
    }
}

impl From<Option<i64>> for SummaryMode {
    fn from(max_length: Option<i64>) -> Self {
        max_length.map(SummaryMode::from_max_length).unwrap_or_default()
    }
}

/// Decides, per block flavour, whether to descend and what text to emit.
///
/// | Flavour | Descend | Text |
/// |---|---|---|
/// | page, note | always | none |
/// | attachment, transcription, callout | unbounded only | none |
/// | table | never | cell texts joined by `|`, unbounded only |
/// | paragraph, list, code | always | `text` property |
/// | anything else | never | none |
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionPolicy {
    mode: SummaryMode,
}

impl ExtractionPolicy {
    /// Create a policy for the given mode.
    pub fn new(mode: SummaryMode) -> Self {
        Self { mode }
    }

    /// Get the active mode.
    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    /// Text the block adds to the summary.
    pub fn contribution<'a>(&self, block: &'a Block) -> Option<Cow<'a, str>> {
        match block.flavour {
            Flavour::Paragraph | Flavour::List | Flavour::Code => block.text(),
            Flavour::Table if self.mode.is_unbounded() => {
                Some(Cow::Owned(cell_texts(block).join(TABLE_CELL_SEPARATOR)))
            }
            _ => None,
        }
    }
}

impl TraversalPolicy for ExtractionPolicy {
    fn descend(&self, block: &Block) -> bool {
        match block.flavour {
            Flavour::Page | Flavour::Note => true,
            Flavour::Paragraph | Flavour::List | Flavour::Code => true,
            Flavour::Attachment | Flavour::Transcription | Flavour::Callout => {
                self.mode.is_unbounded()
            }
            Flavour::Unknown(ref name) => {
                log::debug!("Not descending into unknown flavour '{}'", name);
                false
            }
            _ => false,
        }
    }
}
