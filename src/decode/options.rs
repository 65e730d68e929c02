//! Decoding options and configuration.

/// Options for decoding snapshots.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Error handling mode for malformed block entries
    pub error_mode: ErrorMode,

    /// Whether trashed documents count as referenced documents
    pub include_trash: bool,

    /// Whether batch operations may use the thread pool
    pub parallel: bool,
}

impl DecodeOptions {
    /// Create new decode options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip malformed blocks).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Include or exclude trashed documents from document id harvesting.
    pub fn with_trash(mut self, include: bool) -> Self {
        self.include_trash = include;
        self
    }

    /// Exclude trashed documents from document id harvesting.
    pub fn without_trash(mut self) -> Self {
        self.include_trash = false;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            include_trash: true,
            parallel: true,
        }
    }
}

/// Error handling mode during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any malformed block
    #[default]
    Strict,
    /// Skip malformed blocks and continue
    Lenient,
}
