//! The per-actor FIFO queue with a skip cache.
//!
//! A mailbox is a multi-producer unbounded channel plus a consumer-side
//! *skip cache*: messages the dispatcher examined but could not match are
//! set aside there instead of being discarded. Every new receive attempt
//! re-examines the cache from the front, in the order the messages were
//! originally skipped, before any fresh message is considered. Repeated
//! unsuccessful attempts therefore leave the mailbox contents unchanged.
//!
//! Only the owning dispatcher pops; senders are cloneable handles.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::mpsc;
use tokio::time::Instant;

// Layer 3: Internal module imports
use super::metrics::MailboxMetrics;
use crate::message::Envelope;

/// Outcome of an awaited receive.
#[derive(Debug)]
pub enum RecvOutcome {
    /// A fresh message arrived.
    Received(Envelope),
    /// The deadline passed before any message arrived.
    TimedOut,
    /// All senders are gone and the queue is drained.
    Closed,
}

/// Sending half of a mailbox. Cheap to clone, safe to share.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::UnboundedSender<Envelope>,
    metrics: Arc<MailboxMetrics>,
}

impl MailboxSender {
    /// Append an envelope. A closed mailbox hands the envelope back so the
    /// caller can apply its dead-letter policy.
    pub fn push(&self, envelope: Envelope) -> Result<(), Envelope> {
        match self.tx.send(envelope) {
            Ok(()) => {
                self.metrics.record_sent();
                Ok(())
            }
            Err(rejected) => Err(rejected.0),
        }
    }

    /// The counters shared with the receiving half.
    pub fn metrics(&self) -> &Arc<MailboxMetrics> {
        &self.metrics
    }
}

/// Receiving half of a mailbox, owned by one dispatcher.
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Envelope>,
    cache: VecDeque<Envelope>,
    cursor: usize,
    metrics: Arc<MailboxMetrics>,
}

/// Create a connected mailbox pair.
pub fn mailbox() -> (Mailbox, MailboxSender) {
    let (tx, rx) = mpsc::unbounded_channel();
    let metrics = Arc::new(MailboxMetrics::new());

    let receiver = Mailbox {
        rx,
        cache: VecDeque::new(),
        cursor: 0,
        metrics: Arc::clone(&metrics),
    };
    let sender = MailboxSender { tx, metrics };

    (receiver, sender)
}

impl Mailbox {
    /// Begin a new receive attempt: skipped messages become visible again,
    /// front first, in their original skip order.
    pub fn reset_skip(&mut self) {
        self.cursor = 0;
    }

    /// Remove the next unexamined message, serving the skip cache before
    /// fresh arrivals. `None` when both are exhausted.
    pub fn take_next(&mut self) -> Option<Envelope> {
        if self.cursor < self.cache.len() {
            return self.cache.remove(self.cursor);
        }
        match self.rx.try_recv() {
            Ok(envelope) => {
                self.metrics.record_received();
                Some(envelope)
            }
            Err(_) => None,
        }
    }

    /// Set an examined envelope aside. It keeps its position relative to
    /// previously skipped messages and is not reconsidered until the next
    /// [`reset_skip`](Self::reset_skip).
    pub fn skip(&mut self, envelope: Envelope) {
        self.cache.insert(self.cursor, envelope);
        self.cursor += 1;
        self.metrics.record_skipped();
    }

    /// Await a fresh message, up to `deadline` if one is given.
    ///
    /// Callers drain [`take_next`](Self::take_next) first; this only waits
    /// on the channel.
    pub async fn recv(&mut self, deadline: Option<Instant>) -> RecvOutcome {
        let received = match deadline {
            Some(at) => tokio::select! {
                biased;
                received = self.rx.recv() => received,
                () = tokio::time::sleep_until(at) => return RecvOutcome::TimedOut,
            },
            None => self.rx.recv().await,
        };
        match received {
            Some(envelope) => {
                self.metrics.record_received();
                RecvOutcome::Received(envelope)
            }
            None => RecvOutcome::Closed,
        }
    }

    /// Stop accepting new messages. Already-sent messages stay drainable.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Remove everything left: the skip cache and any undelivered channel
    /// backlog, in examination order. Used during teardown.
    pub fn drain_remaining(&mut self) -> Vec<Envelope> {
        let mut remaining: Vec<Envelope> = self.cache.drain(..).collect();
        self.cursor = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            self.metrics.record_received();
            remaining.push(envelope);
        }
        remaining
    }

    /// The counters shared with the sending half.
    pub fn metrics(&self) -> &Arc<MailboxMetrics> {
        &self.metrics
    }

    /// Number of messages currently set aside in the skip cache.
    pub fn skipped_len(&self) -> usize {
        self.cache.len()
    }
}
