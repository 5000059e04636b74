use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("question index {index} is out of range (0..{count})")]
    OutOfRange { index: usize, count: usize },
}

/// Tracks which question is on screen. Never wraps and never leaves
/// `0..count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    count: usize,
}

impl Navigator {
    /// `count` must be at least 1; a zero count is treated as 1.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            current: 0,
            count: count.max(1),
        }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.count
    }

    /// Move forward one question. No-op on the last question.
    pub fn next(&mut self) {
        if !self.is_last() {
            self.current += 1;
        }
    }

    /// Move back one question. No-op on the first question.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// # Errors
    ///
    /// Returns `NavigationError::OutOfRange` and leaves the position unchanged
    /// when `index >= count`.
    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.count {
            return Err(NavigationError::OutOfRange {
                index,
                count: self.count,
            });
        }
        self.current = index;
        Ok(())
    }

    /// Fraction of the quiz reached, counting the current question.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.count as f64
    }
}
