//! Summary length budget.

use super::SummaryMode;

/// Remaining character allowance for summary text.
///
/// The bound is soft: a contribution is accepted whole while any budget is
/// left, even if it overruns. Once the remaining count reaches zero or
/// below, further contributions are refused. The count never goes back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBudget {
    remaining: Option<i64>,
}

impl SummaryBudget {
    /// Create a budget for the given mode.
    pub fn new(mode: SummaryMode) -> Self {
        let remaining = match mode {
            SummaryMode::Bounded(max) => Some(i64::try_from(max).unwrap_or(i64::MAX)),
            SummaryMode::Unbounded => None,
        };
        Self { remaining }
    }

    /// Check whether the budget is disabled.
    pub fn is_unbounded(&self) -> bool {
        self.remaining.is_none()
    }

    /// Remaining characters (`None` when unbounded).
    pub fn remaining(&self) -> Option<i64> {
        self.remaining
    }

    /// Check whether a bounded budget has been used up.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Some(r) if r <= 0)
    }

    /// Append `text` to `summary` if the budget allows it.
    ///
    /// Returns whether the text was appended.
    pub fn offer(&mut self, text: &str, summary: &mut String) -> bool {
        match self.remaining.as_mut() {
            None => {
                summary.push_str(text);
                true
            }
            Some(remaining) if *remaining > 0 => {
                summary.push_str(text);
                let len = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
                *remaining = remaining.saturating_sub(len);
                true
            }
            Some(_) => false,
        }
    }
}
