//! The timer service backing `delayed_send` and `delayed_reply`.
//!
//! One background task per actor system owns a `DelayQueue` of scheduled
//! envelopes. Producers hand entries over an unbounded channel; expiry
//! delivers through the normal mailbox path, so delayed messages obey the
//! same dead-letter policy as immediate ones. Entries scheduled for an
//! actor that dies in the meantime are simply dropped at delivery time.

// Layer 1: Standard library imports
use std::future::poll_fn;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::time::DelayQueue;
use tracing::trace;

// Layer 3: Internal module imports
use crate::actor::Address;
use crate::message::Envelope;

struct Entry {
    target: Address,
    envelope: Envelope,
    delay: Duration,
}

/// Handle to the per-system timer task.
pub(crate) struct TimerService {
    tx: mpsc::UnboundedSender<Entry>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TimerService {
    /// Spawn the wheel task. Must run inside a tokio runtime.
    pub(crate) fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_wheel(rx));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Schedule `envelope` for delivery to `target` after `delay`.
    pub(crate) fn schedule(&self, target: Address, envelope: Envelope, delay: Duration) {
        let entry = Entry {
            target,
            envelope,
            delay,
        };
        if self.tx.send(entry).is_err() {
            trace!("timer wheel stopped; dropping delayed message");
        }
    }

    /// Stop the wheel, dropping entries that have not come due.
    pub(crate) fn stop(&self) {
        if let Some(worker) = self.worker.lock().take() {
            worker.abort();
        }
    }
}

impl std::fmt::Debug for TimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerService").finish_non_exhaustive()
    }
}

async fn run_wheel(mut rx: mpsc::UnboundedReceiver<Entry>) {
    let mut queue: DelayQueue<(Address, Envelope)> = DelayQueue::new();
    loop {
        tokio::select! {
            entry = rx.recv() => match entry {
                Some(Entry { target, envelope, delay }) => {
                    queue.insert((target, envelope), delay);
                }
                // All producers are gone: nothing can be scheduled anymore.
                None => break,
            },
            expired = poll_fn(|cx| queue.poll_expired(cx)), if !queue.is_empty() => {
                if let Some(expired) = expired {
                    let (target, envelope) = expired.into_inner();
                    target.deliver(envelope);
                }
            }
        }
    }
}
