//! Options for batch imports.

use std::time::Duration;

/// Delay between two per-entry calls of a batch unless configured otherwise.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Batch behavior for [`crate::TranslationService::import_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Pause between consecutive entries. The repository and the vendor are shared.
    pub throttle: Duration,
    /// Stop issuing calls after this many entries; the rest are reported as not attempted.
    pub max_entries: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            throttle: DEFAULT_THROTTLE,
            max_entries: None,
        }
    }
}

impl BatchOptions {
    /// Creates default batch options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pause between entries.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Caps the number of entries processed.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }
}
