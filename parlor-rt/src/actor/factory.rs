//! The factory spawning style.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::address::Address;
use super::context::ActorContext;
use crate::supervision::ExitReason;
use crate::system::{ActorSystem, SpawnError};

type InitFn<S> = Arc<dyn Fn(&mut S, &mut ActorContext<S>) + Send + Sync>;
type ExitFn<S> = Arc<dyn Fn(&mut S, &mut ActorContext<S>, ExitReason) + Send + Sync>;

/// Factory for event-based actors whose per-instance state is the spawn
/// argument.
///
/// The factory holds an init hook and an optional exit hook; every
/// [`spawn`](Self::spawn) binds a fresh state value, runs the init hook
/// (which typically installs the initial behavior with `ctx.become_`), and
/// enters dispatch. An actor whose init hook installs nothing just runs
/// its hooks and terminates with reason `normal`.
///
/// # Example
/// ```rust,no_run
/// use parlor_rt::actor::ActorFactory;
/// use parlor_rt::behavior::{Behavior, Pattern};
/// use parlor_rt::message::ValueKind;
/// use parlor_rt::system::ActorSystem;
///
/// # fn demo(system: &ActorSystem) -> Result<(), parlor_rt::system::SpawnError> {
/// let doubler = ActorFactory::event_based(|_state: &mut i64, ctx| {
///     ctx.become_(Behavior::new().on(
///         Pattern::new().any(ValueKind::Int),
///         |factor, ctx, msg| {
///             let n = msg.get(0).and_then(|v| v.as_int()).unwrap_or(0);
///             ctx.reply(parlor_rt::msg![n * *factor]);
///             Ok(())
///         },
///     ));
/// });
///
/// let times_two = doubler.spawn(system, 2)?;
/// let times_ten = doubler.spawn(system, 10)?;
/// # Ok(())
/// # }
/// ```
pub struct ActorFactory<S> {
    init: InitFn<S>,
    exit_hook: Option<ExitFn<S>>,
}

impl<S: Send + 'static> ActorFactory<S> {
    /// Create a factory from an init hook.
    pub fn event_based(init: impl Fn(&mut S, &mut ActorContext<S>) + Send + Sync + 'static) -> Self {
        Self {
            init: Arc::new(init),
            exit_hook: None,
        }
    }

    /// Attach an exit hook, run first during teardown of every instance.
    pub fn with_exit_hook(
        mut self,
        hook: impl Fn(&mut S, &mut ActorContext<S>, ExitReason) + Send + Sync + 'static,
    ) -> Self {
        self.exit_hook = Some(Arc::new(hook));
        self
    }

    /// Spawn an instance with its own `state`.
    ///
    /// # Errors
    ///
    /// Fails if the system is shutting down or at its actor limit.
    pub fn spawn(&self, system: &ActorSystem, state: S) -> Result<Address, SpawnError> {
        let init = Arc::clone(&self.init);
        let exit_hook = self.exit_hook.as_ref().map(Arc::clone);
        system.spawn_with(
            state,
            Box::new(move |state, ctx| init(state, ctx)),
            exit_hook.map(|hook| -> super::dispatch::ExitHook<S> {
                Box::new(move |state, ctx, reason| hook(state, ctx, reason))
            }),
        )
    }
}

impl<S> Clone for ActorFactory<S> {
    fn clone(&self) -> Self {
        Self {
            init: Arc::clone(&self.init),
            exit_hook: self.exit_hook.as_ref().map(Arc::clone),
        }
    }
}

impl<S> fmt::Debug for ActorFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorFactory")
            .field("exit_hook", &self.exit_hook.is_some())
            .finish_non_exhaustive()
    }
}
