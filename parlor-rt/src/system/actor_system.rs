//! The actor system facade.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{oneshot, watch};
use tracing::debug;

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::{AskError, SpawnError, SystemError};
use crate::actor::cell::ActorCell;
use crate::actor::context::ActorContext;
use crate::actor::dispatch::{ActorRuntime, ExitHook, InitHook};
use crate::actor::{Address, StateActor};
use crate::behavior::Behavior;
use crate::mailbox;
use crate::message::{Envelope, Message};
use crate::supervision::{self, ExitReason};
use crate::timer::TimerService;
use crate::util::ActorId;

/// System lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SystemState {
    /// Accepting spawns and running actors.
    Running,
    /// Graceful shutdown in progress.
    ShuttingDown,
    /// All actors finished.
    Stopped,
}

pub(crate) struct SystemShared {
    config: SystemConfig,
    registry: DashMap<ActorId, Address>,
    timer: TimerService,
    state: RwLock<SystemState>,
    active_tx: watch::Sender<usize>,
    active_rx: watch::Receiver<usize>,
}

/// The actor system: spawns actors, routes external sends, and manages
/// shutdown. Cheap to clone; all clones share one system.
///
/// Actors are scheduled onto the hosting tokio runtime, one task per
/// actor, so every method that spawns ([`new`](Self::new) starts the timer
/// task) must be called from within a runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use parlor_rt::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let system = ActorSystem::new(SystemConfig::default())?;
///
///     // ... spawn actors, send messages ...
///
///     system.await_all_actors_done().await;
///     system.shutdown().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ActorSystem {
    shared: Arc<SystemShared>,
}

impl ActorSystem {
    /// Create a system with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(config: SystemConfig) -> Result<Self, SystemError> {
        config.validate()?;
        let (active_tx, active_rx) = watch::channel(0usize);
        let shared = Arc::new(SystemShared {
            config,
            registry: DashMap::new(),
            timer: TimerService::start(),
            state: RwLock::new(SystemState::Running),
            active_tx,
            active_rx,
        });
        Ok(Self { shared })
    }

    /// The system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.shared.config
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Whether shutdown has begun.
    pub fn is_shutting_down(&self) -> bool {
        *self.shared.state.read() != SystemState::Running
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a state-machine style actor.
    ///
    /// Installs the behavior returned by
    /// [`StateActor::init_behavior`] and starts dispatching.
    ///
    /// # Errors
    ///
    /// Fails if the system is shutting down or at its actor limit.
    pub fn spawn<A: StateActor>(&self, actor: A) -> Result<Address, SpawnError> {
        self.spawn_with(
            actor,
            Box::new(|state: &mut A, ctx: &mut ActorContext<A>| {
                let behavior = state.init_behavior(ctx);
                ctx.stage_initial(behavior);
            }),
            Some(Box::new(|state: &mut A, ctx: &mut ActorContext<A>, reason| {
                state.on_exit(ctx, reason);
            })),
        )
    }

    /// Spawn an actor from raw parts: per-instance state, an init hook,
    /// and an optional exit hook. Both spawning styles reduce to this.
    pub(crate) fn spawn_with<S: Send + 'static>(
        &self,
        state: S,
        init: InitHook<S>,
        exit_hook: Option<ExitHook<S>>,
    ) -> Result<Address, SpawnError> {
        if self.is_shutting_down() {
            return Err(SpawnError::ShuttingDown);
        }
        let max = self.shared.config.max_actors;
        if max > 0 && self.shared.registry.len() >= max {
            return Err(SpawnError::LimitReached { max });
        }

        let id = ActorId::next();
        let (mailbox, sender) = mailbox::mailbox();
        let cell = Arc::new(ActorCell::new(id, sender));
        let address = Address::from_cell(cell);

        self.shared.registry.insert(id, address.clone());
        self.shared.active_tx.send_modify(|active| *active += 1);

        let ctx = ActorContext::new(self.clone(), address.clone());
        let runtime = ActorRuntime::new(
            state,
            mailbox,
            ctx,
            exit_hook,
            self.shared.config.quantum,
            self.shared.config.strict_unmatched,
        );
        tokio::spawn(runtime.run(init));

        debug!(actor = %address, "spawned actor");
        Ok(address)
    }

    /// Remove a finished actor from the bookkeeping. Called by the
    /// dispatcher as the last step of teardown.
    pub(crate) fn finish_actor(&self, id: ActorId) {
        self.shared.registry.remove(&id);
        self.shared
            .active_tx
            .send_modify(|active| *active = active.saturating_sub(1));
    }

    // ------------------------------------------------------------------
    // Messaging from outside any actor
    // ------------------------------------------------------------------

    /// Send an anonymous message to `target`.
    pub fn send(&self, target: &Address, message: Message) {
        target.deliver(Envelope::new(message));
    }

    /// Send an anonymous message to `target` after `delay`.
    pub fn delayed_send(&self, target: &Address, delay: Duration, message: Message) {
        self.shared
            .timer
            .schedule(target.clone(), Envelope::new(message), delay);
    }

    /// Hand a prepared envelope to the timer wheel.
    pub(crate) fn schedule_envelope(&self, target: Address, envelope: Envelope, delay: Duration) {
        self.shared.timer.schedule(target, envelope, delay);
    }

    /// Issue a synchronous request from outside any actor and await the
    /// reply as a future.
    ///
    /// An ephemeral requester actor performs the `sync_send` and forwards
    /// the correlated reply. If the target is dead or dies before
    /// replying, the reply is the synthesized `('EXITED', reason)`
    /// message; if nothing arrives within the configured ask timeout, the
    /// call fails with [`AskError::NoReply`].
    pub async fn ask(&self, target: &Address, message: Message) -> Result<Message, AskError> {
        struct AskState {
            reply_tx: Option<oneshot::Sender<Message>>,
        }

        let timeout = self.shared.config.ask_timeout;
        let (reply_tx, reply_rx) = oneshot::channel();
        let target = target.clone();

        self.spawn_with(
            AskState {
                reply_tx: Some(reply_tx),
            },
            Box::new(move |_state: &mut AskState, ctx: &mut ActorContext<AskState>| {
                let handle = ctx.sync_send(&target, message);
                let awaiting = Behavior::<AskState>::new()
                    .others(|state, ctx, msg| {
                        if let Some(tx) = state.reply_tx.take() {
                            let _ = tx.send(msg.clone());
                        }
                        ctx.quit(ExitReason::Normal);
                        Ok(())
                    })
                    .after(timeout, |_state, ctx| {
                        ctx.quit(ExitReason::Normal);
                        Ok(())
                    });
                ctx.await_response(handle, awaiting);
            }),
            None,
        )
        .map_err(|_| AskError::ShuttingDown)?;

        reply_rx.await.map_err(|_| AskError::NoReply(timeout))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Wait until every actor in the system has terminated.
    pub async fn await_all_actors_done(&self) {
        let mut active = self.shared.active_rx.clone();
        let _ = active.wait_for(|count| *count == 0).await;
    }

    /// Gracefully shut the system down: broadcast an untrappable kill,
    /// wait for all actors to finish, and stop the timer wheel.
    ///
    /// # Errors
    ///
    /// [`SystemError::ShuttingDown`] if shutdown already began;
    /// [`SystemError::ShutdownTimeout`] if actors outlive the configured
    /// timeout.
    pub async fn shutdown(&self) -> Result<(), SystemError> {
        {
            let mut state = self.shared.state.write();
            if *state != SystemState::Running {
                return Err(SystemError::ShuttingDown);
            }
            *state = SystemState::ShuttingDown;
        }

        for entry in self.shared.registry.iter() {
            let envelope = Envelope::new(supervision::exit_message(ExitReason::Kill));
            entry.value().deliver(envelope);
        }

        let timeout = self.shared.config.shutdown_timeout;
        let waited = tokio::time::timeout(timeout, self.await_all_actors_done()).await;
        self.shared.timer.stop();

        match waited {
            Ok(()) => {
                *self.shared.state.write() = SystemState::Stopped;
                debug!("actor system stopped");
                Ok(())
            }
            Err(_) => Err(SystemError::ShutdownTimeout {
                timeout,
                remaining: self.shared.registry.len(),
            }),
        }
    }
}

impl std::fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorSystem")
            .field("actors", &self.actor_count())
            .field("state", &*self.shared.state.read())
            .finish()
    }
}
