//! The handler-side actor context.
//!
//! The runtime passes a context into every handler instead of exposing an
//! ambient `self` global: worker threads serve many actors, so the current
//! actor must travel explicitly with the invocation. The context carries
//! the actor's own address, the message being handled, and every operation
//! a handler may perform: sending, replying, behavior changes, supervision
//! edges, and termination.
//!
//! Behavior-stack mutations and `quit` are *staged*: they take effect after
//! the current handler returns, never in its middle. Messages sent from a
//! handler are therefore matched against the post-`become` behavior on the
//! next receive step.

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tracing::debug;

// Layer 3: Internal module imports
use super::address::Address;
use crate::behavior::Behavior;
use crate::message::{Envelope, Message};
use crate::supervision::{self, ExitReason};
use crate::system::ActorSystem;
use crate::util::RequestId;

/// Handle to a pending synchronous request.
///
/// Returned by [`ActorContext::sync_send`]; pass it to
/// [`ActorContext::await_response`] or
/// [`ActorContext::handle_response`] together with the clauses that should
/// receive the correlated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHandle {
    pub(crate) id: RequestId,
}

impl ResponseHandle {
    /// The correlation id of the request.
    pub fn request_id(&self) -> RequestId {
        self.id
    }
}

/// Staged behavior-stack mutation, applied after the handler returns.
pub(crate) enum StackOp<S> {
    /// Replace the top behavior.
    Replace(Behavior<S>),
    /// Push on top, keeping the previous behavior underneath.
    Push(Behavior<S>),
    /// Pop the top behavior.
    Pop,
    /// Push a one-shot frame awaiting the reply to `id`.
    AwaitResponse { id: RequestId, behavior: Behavior<S> },
}

/// Per-invocation context handed to every handler of an actor with state
/// type `S`.
pub struct ActorContext<S> {
    system: ActorSystem,
    address: Address,
    current: Option<Envelope>,
    staged: Vec<StackOp<S>>,
    pending: HashSet<RequestId>,
    quit: Option<ExitReason>,
}

impl<S> ActorContext<S> {
    pub(crate) fn new(system: ActorSystem, address: Address) -> Self {
        Self {
            system,
            address,
            current: None,
            staged: Vec::new(),
            pending: HashSet::new(),
            quit: None,
        }
    }

    /// The address of the actor whose handler is executing.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The actor system this actor runs in. Useful for spawning more
    /// actors from inside a handler.
    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    // ------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------

    /// Send an asynchronous message, stamped with this actor as sender.
    pub fn send(&self, target: &Address, message: Message) {
        target.deliver(Envelope::new(message).with_sender(self.address.clone()));
    }

    /// Send `message` to `target` after `delay`, through the timer wheel.
    pub fn delayed_send(&self, target: &Address, delay: Duration, message: Message) {
        let envelope = Envelope::new(message).with_sender(self.address.clone());
        self.system.schedule_envelope(target.clone(), envelope, delay);
    }

    /// Issue a synchronous request and get a handle to its pending reply.
    ///
    /// The request is delivered asynchronously like any other message; the
    /// handle only correlates the eventual reply. If the target is already
    /// dead, or dies before replying, the runtime synthesizes an
    /// `('EXITED', reason)` reply so the handle never dangles.
    pub fn sync_send(&mut self, target: &Address, message: Message) -> ResponseHandle {
        let id = RequestId::new();
        self.pending.insert(id);
        let envelope = Envelope::new(message)
            .with_sender(self.address.clone())
            .as_request(id);
        target.deliver(envelope);
        ResponseHandle { id }
    }

    /// Await the reply to `handle` with a one-shot behavior.
    ///
    /// Until a clause of `behavior` consumes the correlated reply (or its
    /// `after` clause fires), every other message is set aside in arrival
    /// order and re-examined afterwards. Replies with ids nobody asked for
    /// are dropped.
    pub fn await_response(&mut self, handle: ResponseHandle, behavior: Behavior<S>) {
        self.staged.push(StackOp::AwaitResponse {
            id: handle.id,
            behavior,
        });
    }

    /// Register a continuation for the reply to `handle`.
    ///
    /// Same mechanics as [`await_response`](Self::await_response); the name
    /// mirrors the event-based idiom of installing the continuation from
    /// inside a running handler and returning immediately.
    pub fn handle_response(&mut self, handle: ResponseHandle, behavior: Behavior<S>) {
        self.await_response(handle, behavior);
    }

    /// Reply to the sender of the message being handled.
    ///
    /// Carries the current message's request id, if it had one, so a
    /// synchronous requester receives it as its correlated reply. A reply
    /// to a message without sender is silently dropped.
    pub fn reply(&self, message: Message) {
        let Some(current) = &self.current else {
            return;
        };
        match &current.sender {
            Some(target) => {
                let mut envelope = Envelope::new(message).with_sender(self.address.clone());
                if let Some(id) = current.request_id() {
                    envelope = envelope.as_response(id);
                }
                target.deliver(envelope);
            }
            None => {
                debug!(actor = %self.address, "reply without sender dropped");
            }
        }
    }

    /// Like [`reply`](Self::reply), delivered after `delay` through the
    /// timer wheel.
    pub fn delayed_reply(&self, delay: Duration, message: Message) {
        let Some(current) = &self.current else {
            return;
        };
        match &current.sender {
            Some(target) => {
                let mut envelope = Envelope::new(message).with_sender(self.address.clone());
                if let Some(id) = current.request_id() {
                    envelope = envelope.as_response(id);
                }
                self.system
                    .schedule_envelope(target.clone(), envelope, delay);
            }
            None => {
                debug!(actor = %self.address, "delayed reply without sender dropped");
            }
        }
    }

    /// Sender of the most recently dequeued message, if it had one.
    pub fn last_sender(&self) -> Option<&Address> {
        self.current.as_ref().and_then(|env| env.sender.as_ref())
    }

    /// The most recently dequeued message.
    pub fn last_dequeued(&self) -> Option<&Message> {
        self.current.as_ref().map(|env| &env.message)
    }

    // ------------------------------------------------------------------
    // Behavior stack
    // ------------------------------------------------------------------

    /// Replace the top behavior after this handler returns.
    pub fn become_(&mut self, behavior: Behavior<S>) {
        self.staged.push(StackOp::Replace(behavior));
    }

    /// Push a behavior, keeping the current one underneath. `unbecome`
    /// returns to it.
    pub fn become_keep(&mut self, behavior: Behavior<S>) {
        self.staged.push(StackOp::Push(behavior));
    }

    /// Pop the top behavior. Popping the last behavior terminates the
    /// actor with reason `normal`.
    pub fn unbecome(&mut self) {
        self.staged.push(StackOp::Pop);
    }

    // ------------------------------------------------------------------
    // Supervision
    // ------------------------------------------------------------------

    /// Establish a symmetric link with `partner`.
    ///
    /// If `partner` already terminated, this actor immediately receives the
    /// usual `('EXIT', reason)` message instead (dropped, trapped, or
    /// fatal, depending on the trap-exit flag and the reason).
    pub fn link_to(&self, partner: &Address) {
        match partner.cell().add_link(self.address.clone()) {
            Ok(()) => {
                // Own side cannot have terminated: we are running.
                let _ = self.address.cell().add_link(partner.clone());
            }
            Err(reason) => {
                let envelope = Envelope::new(supervision::exit_message(reason))
                    .with_sender(partner.clone());
                self.address.deliver(envelope);
            }
        }
    }

    /// Remove a previously established link, on both sides.
    pub fn unlink(&self, partner: &Address) {
        partner.cell().remove_link(self.address.id());
        self.address.cell().remove_link(partner.id());
    }

    /// Observe `target`: when it terminates, this actor receives a single
    /// `('DOWN', reason)` message. Monitoring a dead actor delivers the
    /// notification immediately. Monitors never propagate death.
    pub fn monitor(&self, target: &Address) {
        if let Err(reason) = target.cell().add_observer(self.address.clone()) {
            let envelope =
                Envelope::new(supervision::down_message(reason)).with_sender(target.clone());
            self.address.deliver(envelope);
        }
    }

    /// Toggle exit trapping. A trapping actor receives `('EXIT', reason)`
    /// messages from dying link partners as ordinary messages instead of
    /// terminating with them.
    pub fn trap_exit(&self, on: bool) {
        self.address.cell().set_trap_exit(on);
    }

    /// Terminate this actor once the current handler returns. Remaining
    /// mailbox contents are dropped; supervision fan-out follows.
    pub fn quit(&mut self, reason: ExitReason) {
        self.quit = Some(reason);
    }

    // ------------------------------------------------------------------
    // Dispatcher plumbing
    // ------------------------------------------------------------------

    pub(crate) fn set_current(&mut self, envelope: Envelope) {
        self.current = Some(envelope);
    }

    /// Stage the initial behavior underneath anything the init hook
    /// staged itself (a response await installed during init must sit on
    /// top of the initial behavior).
    pub(crate) fn stage_initial(&mut self, behavior: Behavior<S>) {
        self.staged.insert(0, StackOp::Push(behavior));
    }

    pub(crate) fn take_staged(&mut self) -> Vec<StackOp<S>> {
        std::mem::take(&mut self.staged)
    }

    pub(crate) fn take_quit(&mut self) -> Option<ExitReason> {
        self.quit.take()
    }

    pub(crate) fn pending_contains(&self, id: RequestId) -> bool {
        self.pending.contains(&id)
    }

    pub(crate) fn pending_remove(&mut self, id: RequestId) {
        self.pending.remove(&id);
    }
}
