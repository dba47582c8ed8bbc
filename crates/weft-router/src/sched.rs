//! Proportional-share run-queue registration.
//!
//! The runtime scheduler serves elements in proportion to their tickets; an
//! entry's stride (`STRIDE1 / tickets`) is how far its pass value advances
//! per quantum, so higher tickets mean more frequent service. Only the
//! registration contract lives here — the run loop itself belongs to the
//! runtime.

use std::collections::HashMap;

use compact_str::CompactString;
use tracing::debug;
use weft_common::name::ElementName;

use crate::error::ConfigError;
use crate::schedule::tickets::{MAX_TICKETS, MIN_TICKETS};

/// Stride numerator: an entry with `t` tickets advances by `STRIDE1 / t`
/// per quantum. With tickets capped at [`MAX_TICKETS`] the stride never
/// degenerates to zero.
pub const STRIDE1: u32 = 1 << 16;

/// One registered schedulable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub name: CompactString,
    pub tickets: u32,
    pub stride: u32,
}

/// The run queue's registration surface.
///
/// Each element may join at most once; a second join is a configuration
/// error and leaves the original entry untouched.
#[derive(Debug, Default)]
pub struct RunQueue {
    entries: Vec<QueueEntry>,
    by_name: HashMap<CompactString, usize>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element` with the given ticket weight.
    pub fn join(&mut self, element: &ElementName, tickets: u32) -> Result<(), ConfigError> {
        if self.by_name.contains_key(element.as_str()) {
            return Err(ConfigError::AlreadyScheduled(element.to_string()));
        }
        let tickets = tickets.clamp(MIN_TICKETS, MAX_TICKETS);
        let entry = QueueEntry {
            name: CompactString::from(element.as_str()),
            tickets,
            stride: STRIDE1 / tickets,
        };
        debug!(element = %element, tickets, stride = entry.stride, "joined run queue");
        self.by_name.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn tickets(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|&i| self.entries[i].tickets)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Sum of all registered tickets, the denominator of every element's
    /// CPU share.
    pub fn total_tickets(&self) -> u64 {
        self.entries.iter().map(|e| e.tickets as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ElementName {
        ElementName::parse(s).unwrap()
    }

    // ─── Registration ───────────────────────────────────────────────────

    #[test]
    fn join_records_tickets_and_stride() {
        let mut q = RunQueue::new();
        q.join(&name("src"), 1024).unwrap();
        assert_eq!(q.tickets("src"), Some(1024));
        assert_eq!(q.entries()[0].stride, 64);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn duplicate_join_rejected_and_original_kept() {
        let mut q = RunQueue::new();
        q.join(&name("src"), 2048).unwrap();
        let err = q.join(&name("src"), 512).unwrap_err();
        assert_eq!(err, ConfigError::AlreadyScheduled("src".into()));
        assert_eq!(q.tickets("src"), Some(2048), "first registration wins");
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn join_clamps_out_of_range_tickets() {
        let mut q = RunQueue::new();
        q.join(&name("a"), 0).unwrap();
        q.join(&name("b"), u32::MAX).unwrap();
        assert_eq!(q.tickets("a"), Some(MIN_TICKETS));
        assert_eq!(q.tickets("b"), Some(MAX_TICKETS));
    }

    // ─── Shares ─────────────────────────────────────────────────────────

    #[test]
    fn stride_is_inverse_to_tickets() {
        let mut q = RunQueue::new();
        q.join(&name("fast"), 2048).unwrap();
        q.join(&name("slow"), 512).unwrap();
        let fast = &q.entries()[0];
        let slow = &q.entries()[1];
        assert!(fast.stride < slow.stride);
        assert_eq!(slow.stride / fast.stride, 4, "4x tickets = 4x service");
    }

    #[test]
    fn total_tickets_sums_entries() {
        let mut q = RunQueue::new();
        q.join(&name("a"), 1024).unwrap();
        q.join(&name("b"), 512).unwrap();
        assert_eq!(q.total_tickets(), 1536);
    }

    #[test]
    fn empty_queue() {
        let q = RunQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.total_tickets(), 0);
        assert!(!q.contains("src"));
        assert_eq!(q.tickets("src"), None);
    }
}
