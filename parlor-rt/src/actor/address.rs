//! Actor handles.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::trace;

// Layer 3: Internal module imports
use super::cell::ActorCell;
use crate::message::{Envelope, Message};
use crate::supervision::{self, ExitReason};
use crate::util::ActorId;

/// A handle referencing an actor by id.
///
/// Addresses are freely copyable, comparable and hashable by id, and stay
/// valid after the actor terminated: they keep answering identity probes
/// ([`is_alive`](Self::is_alive), [`exit_reason`](Self::exit_reason)) while
/// every send is silently dropped. The one exception is a synchronous
/// request addressed to a dead actor, which is answered with a synthesized
/// `('EXITED', reason)` response so the requester never hangs.
///
/// An address holds a shared reference to the actor's control block only;
/// the actor's state and queue contents are owned by its scheduler task,
/// so retaining addresses (in link sets or anywhere else) does not retain
/// the actor's resources.
#[derive(Clone)]
pub struct Address {
    cell: Arc<ActorCell>,
}

impl Address {
    pub(crate) fn from_cell(cell: Arc<ActorCell>) -> Self {
        Self { cell }
    }

    pub(crate) fn cell(&self) -> &ActorCell {
        &self.cell
    }

    /// The actor's id.
    pub fn id(&self) -> ActorId {
        self.cell.id()
    }

    /// Whether the actor is still accepting messages.
    pub fn is_alive(&self) -> bool {
        self.cell.is_alive()
    }

    /// The recorded exit reason, once the actor terminated.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.cell.exit_reason()
    }

    /// Send an anonymous asynchronous message (no sender, no correlation).
    ///
    /// Inside a handler prefer
    /// [`ActorContext::send`](crate::actor::ActorContext::send), which
    /// stamps the sending actor as the origin.
    pub fn send(&self, message: Message) {
        self.deliver(Envelope::new(message));
    }

    /// Route an envelope to the actor, applying the dead-letter policy if
    /// it no longer accepts mail.
    pub(crate) fn deliver(&self, envelope: Envelope) {
        if let Err(envelope) = self.cell.push_if_alive(envelope) {
            self.reject_dead(envelope);
        }
    }

    /// Dead-letter policy: synchronous requests are answered with
    /// `('EXITED', reason)`; everything else is dropped.
    fn reject_dead(&self, envelope: Envelope) {
        if let (Some(id), Some(requester)) = (envelope.request_id(), envelope.sender.as_ref()) {
            let reason = self.exit_reason().unwrap_or(ExitReason::Normal);
            let response = Envelope::new(supervision::exited_message(reason))
                .with_sender(self.clone())
                .as_response(id);
            // The requester may be gone as well; then the reply just dies.
            let _ = requester.cell.push_if_alive(response);
        } else {
            trace!(target = %self, "dropping message to terminated actor");
            self.cell.record_dropped();
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("id", &self.id())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor{}", self.id())
    }
}
