//! Leveled diagnostics collaborator.
//!
//! Configuration code never aborts on a bad directive: it reports through a
//! [`Reporter`] and keeps going. Warnings never alter control flow; errors
//! are counted so the caller can decide, after the fact, whether startup may
//! proceed.

use tracing::{error, warn};

/// Sink for configuration diagnostics.
pub trait Reporter {
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Forwards diagnostics to `tracing`, keeping counts for exit decisions.
#[derive(Debug, Default)]
pub struct LogReporter {
    warnings: usize,
    errors: usize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }
}

impl Reporter for LogReporter {
    fn warning(&mut self, message: &str) {
        self.warnings += 1;
        warn!("{message}");
    }

    fn error(&mut self, message: &str) {
        self.errors += 1;
        error!("{message}");
    }
}

/// Collects diagnostics in memory. Used by tests and anywhere messages must
/// be inspected rather than logged.
#[derive(Debug, Default)]
pub struct CollectReporter {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CollectReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

impl Reporter for CollectReporter {
    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_reporter_separates_levels() {
        let mut r = CollectReporter::new();
        r.warning("w1");
        r.error("e1");
        r.warning("w2");
        assert_eq!(r.warnings, vec!["w1", "w2"]);
        assert_eq!(r.errors, vec!["e1"]);
        assert!(r.has_errors());
    }

    #[test]
    fn log_reporter_counts() {
        let mut r = LogReporter::new();
        r.warning("w");
        r.error("e");
        r.error("e");
        assert_eq!(r.warning_count(), 1);
        assert_eq!(r.error_count(), 2);
    }

    #[test]
    fn fresh_collect_reporter_is_empty() {
        assert!(CollectReporter::new().is_empty());
    }
}
