//! The dispatch loop: one scheduling turn of an actor.
//!
//! Every actor runs this loop inside its own task. At most one task exists
//! per actor, which is the runtime's fundamental invariant: no two workers
//! ever execute the same actor's code concurrently, and handlers never need
//! locks around the actor's own state.
//!
//! The receive step works through the mailbox's skip cache: a fresh attempt
//! re-examines previously skipped messages in their original order before
//! any new mail, system messages are intercepted ahead of behavior
//! matching, and messages no clause accepts are set aside again. Handlers
//! run to completion; behavior-stack changes and `quit` staged by a handler
//! are applied when it returns. A bounded quantum of messages is processed
//! per turn, then the task yields to its worker cooperatively.

// Layer 1: Standard library imports
use std::panic::{catch_unwind, AssertUnwindSafe};

// Layer 2: Third-party crate imports
use tokio::time::Instant;
use tracing::{debug, trace, warn};

// Layer 3: Internal module imports
use super::cell::ActorCell;
use super::context::{ActorContext, StackOp};
use crate::behavior::{Behavior, HandlerError};
use crate::mailbox::{Mailbox, RecvOutcome};
use crate::message::Envelope;
use crate::supervision::{self, ExitReason};
use crate::util::RequestId;

/// Actor construction hook: runs before any message is dispatched.
pub(crate) type InitHook<S> = Box<dyn FnOnce(&mut S, &mut ActorContext<S>) + Send>;

/// Actor teardown hook: first step of termination.
pub(crate) type ExitHook<S> = Box<dyn FnOnce(&mut S, &mut ActorContext<S>, ExitReason) + Send>;

/// One entry of the behavior stack.
enum Frame<S> {
    /// An installed behavior.
    Plain(Behavior<S>),
    /// One-shot frame awaiting the correlated reply to `id`.
    Response { id: RequestId, behavior: Behavior<S> },
}

impl<S> Frame<S> {
    fn behavior(&self) -> &Behavior<S> {
        match self {
            Self::Plain(behavior) => behavior,
            Self::Response { behavior, .. } => behavior,
        }
    }

    fn behavior_mut(&mut self) -> &mut Behavior<S> {
        match self {
            Self::Plain(behavior) => behavior,
            Self::Response { behavior, .. } => behavior,
        }
    }
}

/// What examining one candidate message decided.
enum Step {
    /// A handler ran.
    Handled,
    /// No clause accepted the message; it goes to the skip cache.
    Skipped(Envelope),
    /// The message was consumed without running a handler.
    Dropped,
    /// The actor must terminate.
    Terminate(ExitReason),
}

/// The per-actor execution state: everything only the dispatch task sees.
pub(crate) struct ActorRuntime<S: Send + 'static> {
    state: S,
    stack: Vec<Frame<S>>,
    mailbox: Mailbox,
    ctx: ActorContext<S>,
    exit_hook: Option<ExitHook<S>>,
    quantum: usize,
    strict_unmatched: bool,
}

impl<S: Send + 'static> ActorRuntime<S> {
    pub(crate) fn new(
        state: S,
        mailbox: Mailbox,
        ctx: ActorContext<S>,
        exit_hook: Option<ExitHook<S>>,
        quantum: usize,
        strict_unmatched: bool,
    ) -> Self {
        Self {
            state,
            stack: Vec::new(),
            mailbox,
            ctx,
            exit_hook,
            quantum: quantum.max(1),
            strict_unmatched,
        }
    }

    /// Run the actor to completion: init hook, event loop, teardown.
    pub(crate) async fn run(mut self, init: InitHook<S>) {
        let init_outcome = catch_unwind(AssertUnwindSafe(|| init(&mut self.state, &mut self.ctx)));

        let early_exit = match init_outcome {
            Ok(()) => {
                let staged = self.apply_staged();
                if staged.is_none() && self.stack.is_empty() {
                    // Nothing installed: the actor only ran its hooks.
                    Some(ExitReason::Normal)
                } else {
                    staged
                }
            }
            Err(_) => {
                warn!(actor = %self.ctx.address(), "init hook panicked");
                Some(ExitReason::UnhandledException)
            }
        };

        let reason = match early_exit {
            Some(reason) => reason,
            None => self.event_loop().await,
        };
        self.teardown(reason);
    }

    /// Process messages until the actor terminates.
    async fn event_loop(&mut self) -> ExitReason {
        let mut handled_in_quantum = 0usize;
        loop {
            // A new receive attempt: skipped messages come back first, and
            // the timeout of the active behavior is (re)armed.
            self.mailbox.reset_skip();
            let deadline = self.arm_deadline();

            let outcome = loop {
                let step = match self.mailbox.take_next() {
                    Some(envelope) => self.examine(envelope),
                    None => match self.mailbox.recv(deadline).await {
                        RecvOutcome::Received(envelope) => self.examine(envelope),
                        RecvOutcome::TimedOut => break self.fire_timeout(),
                        RecvOutcome::Closed => break Err(ExitReason::Normal),
                    },
                };
                match step {
                    Step::Handled => break Ok(()),
                    Step::Skipped(envelope) => self.mailbox.skip(envelope),
                    Step::Dropped => {}
                    Step::Terminate(reason) => break Err(reason),
                }
            };

            if let Err(reason) = outcome {
                return reason;
            }
            if let Some(reason) = self.apply_staged() {
                return reason;
            }

            handled_in_quantum += 1;
            if handled_in_quantum >= self.quantum {
                handled_in_quantum = 0;
                tokio::task::yield_now().await;
            }
        }
    }

    /// Deadline for the active behavior's timeout clause, if any.
    fn arm_deadline(&self) -> Option<Instant> {
        self.stack
            .last()
            .and_then(|frame| frame.behavior().timeout_duration())
            .map(|timeout| Instant::now() + timeout)
    }

    /// Decide what to do with one candidate message.
    fn examine(&mut self, envelope: Envelope) -> Step {
        // Correlated replies are filtered by request id, never by pattern.
        if let Some(id) = envelope.response_id() {
            return self.examine_response(id, envelope);
        }

        // Exit messages are intercepted ahead of matching unless trapped.
        if let Some(reason) = supervision::exit_reason_of(&envelope.message) {
            if reason == ExitReason::Kill {
                return Step::Terminate(ExitReason::Kill);
            }
            if !self.cell().trap_exit() {
                return if reason == ExitReason::Normal {
                    Step::Dropped
                } else {
                    Step::Terminate(reason)
                };
            }
        }

        // While a reply is awaited, everything else is set aside.
        if matches!(self.stack.last(), Some(Frame::Response { .. })) {
            return Step::Skipped(envelope);
        }

        self.dispatch_plain(envelope)
    }

    /// Route a correlated reply: dispatch it if it is the one currently
    /// awaited, keep it if its request is still pending, drop it otherwise.
    fn examine_response(&mut self, id: RequestId, envelope: Envelope) -> Step {
        let awaited = matches!(
            self.stack.last(),
            Some(Frame::Response { id: want, .. }) if *want == id
        );
        if awaited {
            return self.dispatch_response(id, envelope);
        }
        if self.ctx.pending_contains(id) {
            // Reply arrived before the await was installed: keep it.
            return Step::Skipped(envelope);
        }
        trace!(actor = %self.ctx.address(), request = %id, "dropping reply with unknown request id");
        Step::Dropped
    }

    /// Match a message against the top behavior and run the winning
    /// handler.
    fn dispatch_plain(&mut self, envelope: Envelope) -> Step {
        let Some(frame) = self.stack.last_mut() else {
            return Step::Terminate(ExitReason::Normal);
        };
        let behavior = frame.behavior_mut();
        let Some(index) = behavior.matching_clause(&envelope.message) else {
            if self.strict_unmatched {
                warn!(
                    actor = %self.ctx.address(),
                    message = %envelope.message,
                    "no clause matched; strict mode terminates the actor"
                );
                return Step::Terminate(ExitReason::UnknownMessage);
            }
            return Step::Skipped(envelope);
        };

        let message = envelope.message.clone();
        self.ctx.set_current(envelope);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            behavior.invoke(index, &mut self.state, &mut self.ctx, &message)
        }));
        self.step_from_handler(outcome)
    }

    /// Run the one-shot response frame on the awaited reply and retire it.
    fn dispatch_response(&mut self, id: RequestId, envelope: Envelope) -> Step {
        let Some(frame) = self.stack.last_mut() else {
            return Step::Dropped;
        };
        let behavior = frame.behavior_mut();
        let Some(index) = behavior.matching_clause(&envelope.message) else {
            // Type mismatch within the one-shot frame: the reply is
            // unmatched there and consumed; the frame stays armed until
            // its timeout fires.
            warn!(
                actor = %self.ctx.address(),
                request = %id,
                message = %envelope.message,
                "reply matched no clause of the awaiting behavior"
            );
            return Step::Dropped;
        };

        let message = envelope.message.clone();
        self.ctx.set_current(envelope);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            behavior.invoke(index, &mut self.state, &mut self.ctx, &message)
        }));
        // The await is over either way.
        self.stack.pop();
        self.ctx.pending_remove(id);
        self.step_from_handler(outcome)
    }

    /// The active behavior's timeout clause fired.
    fn fire_timeout(&mut self) -> Result<(), ExitReason> {
        let Some(frame) = self.stack.last_mut() else {
            return Err(ExitReason::Normal);
        };
        let behavior = frame.behavior_mut();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            behavior.invoke_timeout(&mut self.state, &mut self.ctx)
        }));

        // A timed-out await is retired; its reply, should it still come,
        // is dropped as unknown.
        if let Some(Frame::Response { id, .. }) = self.stack.last() {
            let id = *id;
            self.stack.pop();
            self.ctx.pending_remove(id);
        }

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => {
                warn!(actor = %self.ctx.address(), %error, "timeout handler failed");
                Err(ExitReason::UnhandledException)
            }
            Err(_) => {
                warn!(actor = %self.ctx.address(), "timeout handler panicked");
                Err(ExitReason::UnhandledException)
            }
        }
    }

    fn step_from_handler(&self, outcome: Result<Result<(), HandlerError>, Box<dyn std::any::Any + Send>>) -> Step {
        match outcome {
            Ok(Ok(())) => Step::Handled,
            Ok(Err(error)) => {
                warn!(actor = %self.ctx.address(), %error, "handler failed");
                Step::Terminate(ExitReason::UnhandledException)
            }
            Err(_) => {
                warn!(actor = %self.ctx.address(), "handler panicked");
                Step::Terminate(ExitReason::UnhandledException)
            }
        }
    }

    /// Apply staged stack operations and the staged quit. Returns the exit
    /// reason if the actor is done.
    fn apply_staged(&mut self) -> Option<ExitReason> {
        for op in self.ctx.take_staged() {
            match op {
                StackOp::Replace(behavior) => {
                    self.stack.pop();
                    self.stack.push(Frame::Plain(behavior));
                }
                StackOp::Push(behavior) => self.stack.push(Frame::Plain(behavior)),
                StackOp::Pop => {
                    self.stack.pop();
                }
                StackOp::AwaitResponse { id, behavior } => {
                    self.stack.push(Frame::Response { id, behavior });
                }
            }
        }
        if let Some(reason) = self.ctx.take_quit() {
            return Some(reason);
        }
        if self.stack.is_empty() {
            return Some(ExitReason::Normal);
        }
        None
    }

    fn cell(&self) -> &ActorCell {
        self.ctx.address().cell()
    }

    /// Terminate: exit hook, mailbox drain with `EXITED` notifications,
    /// link fan-out, monitor fan-out, deregistration.
    fn teardown(mut self, reason: ExitReason) {
        debug!(actor = %self.ctx.address(), %reason, "actor terminating");

        if let Some(hook) = self.exit_hook.take() {
            let hook_outcome = catch_unwind(AssertUnwindSafe(|| {
                hook(&mut self.state, &mut self.ctx, reason)
            }));
            if hook_outcome.is_err() {
                warn!(actor = %self.ctx.address(), "exit hook panicked");
            }
        }

        let address = self.ctx.address().clone();
        if let Some((links, observers)) = address.cell().begin_termination(reason) {
            // Stop intake, then answer pending requests and drop the rest.
            self.mailbox.close();
            for envelope in self.mailbox.drain_remaining() {
                match (envelope.request_id(), envelope.sender.as_ref()) {
                    (Some(id), Some(requester)) => {
                        let response = Envelope::new(supervision::exited_message(reason))
                            .with_sender(address.clone())
                            .as_response(id);
                        requester.deliver(response);
                    }
                    _ => self.mailbox.metrics().record_dropped(),
                }
            }

            // Link partners: symmetric set cleanup, then the EXIT message.
            // The receiving dispatcher decides between trapping and dying.
            for partner in links {
                partner.cell().remove_link(address.id());
                let envelope =
                    Envelope::new(supervision::exit_message(reason)).with_sender(address.clone());
                partner.deliver(envelope);
            }

            // Monitors: exactly one DOWN each.
            for observer in observers {
                let envelope =
                    Envelope::new(supervision::down_message(reason)).with_sender(address.clone());
                observer.deliver(envelope);
            }
        }

        self.ctx.system().finish_actor(address.id());
    }
}
