//! Lock-free mailbox counters.
//!
//! Every counter operation is a relaxed atomic increment, cheap enough to
//! stay enabled unconditionally. The counters are shared between the
//! mailbox and all of its sender handles.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Lock-free counters for one mailbox.
///
/// # Example
/// ```rust
/// use parlor_rt::mailbox::MailboxMetrics;
///
/// let metrics = MailboxMetrics::default();
/// metrics.record_sent();
/// metrics.record_received();
///
/// assert_eq!(metrics.sent_count(), 1);
/// assert_eq!(metrics.received_count(), 1);
/// assert_eq!(metrics.in_flight(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MailboxMetrics {
    sent: AtomicU64,
    received: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

impl MailboxMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message accepted into the queue.
    pub fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message handed to the consumer.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message set aside into the skip cache.
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message discarded without being handled.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total messages accepted.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Total messages handed to the consumer.
    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Total skip operations.
    pub fn skipped_count(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Total discarded messages.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Approximate queue depth (sent minus received).
    pub fn in_flight(&self) -> u64 {
        self.sent_count().saturating_sub(self.received_count())
    }
}
