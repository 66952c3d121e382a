//! Per-actor message queues with a skip cache.

pub mod metrics;
pub mod queue;

pub use metrics::MailboxMetrics;
pub use queue::{mailbox, Mailbox, MailboxSender, RecvOutcome};
