//! The shared control block of an actor.
//!
//! The cell carries everything other parties may touch while the actor runs
//! or after it died: the mailbox sender, liveness and trap-exit flags, the
//! link and observer sets, and the recorded exit reason. The actor's state,
//! behavior stack, and skip cache are owned exclusively by its dispatch
//! task and never appear here, so cells held by addresses (including
//! addresses inside other actors' link sets) keep no actor resources alive.
//!
//! The link/observer sets and the exit reason share one mutex: exit-time
//! fan-out drains the sets in the same critical section that records the
//! reason, so a concurrent `link`/`monitor` either lands before the drain
//! (and is notified) or observes the death (and is notified immediately by
//! the caller).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::address::Address;
use crate::mailbox::MailboxSender;
use crate::message::Envelope;
use crate::supervision::ExitReason;
use crate::util::ActorId;

#[derive(Debug, Default)]
struct SupervisionState {
    links: Vec<Address>,
    observers: Vec<Address>,
    exit_reason: Option<ExitReason>,
}

/// Shared, non-owning control block referenced by every [`Address`].
#[derive(Debug)]
pub(crate) struct ActorCell {
    id: ActorId,
    sender: MailboxSender,
    alive: AtomicBool,
    trap_exit: AtomicBool,
    supervision: Mutex<SupervisionState>,
}

impl ActorCell {
    pub(crate) fn new(id: ActorId, sender: MailboxSender) -> Self {
        Self {
            id,
            sender,
            alive: AtomicBool::new(true),
            trap_exit: AtomicBool::new(false),
            supervision: Mutex::new(SupervisionState::default()),
        }
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn trap_exit(&self) -> bool {
        self.trap_exit.load(Ordering::Relaxed)
    }

    pub(crate) fn set_trap_exit(&self, on: bool) {
        self.trap_exit.store(on, Ordering::Relaxed);
    }

    /// Enqueue an envelope if the actor is still accepting mail. A dead or
    /// closing actor hands the envelope back.
    pub(crate) fn push_if_alive(&self, envelope: Envelope) -> Result<(), Envelope> {
        if !self.is_alive() {
            return Err(envelope);
        }
        self.sender.push(envelope)
    }

    pub(crate) fn record_dropped(&self) {
        self.sender.metrics().record_dropped();
    }

    /// Insert `partner` into the link set, or report the recorded exit
    /// reason if this actor already terminated.
    pub(crate) fn add_link(&self, partner: Address) -> Result<(), ExitReason> {
        let mut sup = self.supervision.lock();
        if let Some(reason) = sup.exit_reason {
            return Err(reason);
        }
        if !sup.links.iter().any(|a| a.id() == partner.id()) {
            sup.links.push(partner);
        }
        Ok(())
    }

    pub(crate) fn remove_link(&self, partner: ActorId) {
        let mut sup = self.supervision.lock();
        sup.links.retain(|a| a.id() != partner);
    }

    /// Register `observer` for a `DOWN` notification, or report the exit
    /// reason if this actor already terminated.
    pub(crate) fn add_observer(&self, observer: Address) -> Result<(), ExitReason> {
        let mut sup = self.supervision.lock();
        if let Some(reason) = sup.exit_reason {
            return Err(reason);
        }
        sup.observers.push(observer);
        Ok(())
    }

    /// Record the exit reason and flip the cell dead, returning the link
    /// partners and observers to notify. `None` if termination was already
    /// recorded (fan-out must run exactly once).
    pub(crate) fn begin_termination(
        &self,
        reason: ExitReason,
    ) -> Option<(Vec<Address>, Vec<Address>)> {
        let mut sup = self.supervision.lock();
        if sup.exit_reason.is_some() {
            return None;
        }
        sup.exit_reason = Some(reason);
        self.alive.store(false, Ordering::Release);
        let links = std::mem::take(&mut sup.links);
        let observers = std::mem::take(&mut sup.observers);
        Some((links, observers))
    }

    pub(crate) fn exit_reason(&self) -> Option<ExitReason> {
        self.supervision.lock().exit_reason
    }
}
