//! The state-machine spawning style.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::behavior::Behavior;
use crate::supervision::ExitReason;

/// State-machine style actor: the implementing object *is* the actor's
/// state, and named behaviors are plain methods returning [`Behavior`]
/// values over it.
///
/// On spawn the runtime installs the behavior returned by
/// [`init_behavior`](Self::init_behavior) and dispatches messages against
/// it; handlers switch state with `ctx.become_(...)`.
///
/// # Example
///
/// A door that toggles between two states:
///
/// ```rust
/// use parlor_rt::actor::{ActorContext, StateActor};
/// use parlor_rt::behavior::{Behavior, Pattern};
/// use parlor_rt::message::Atom;
///
/// const KNOCK: Atom = Atom::from_static("knock");
///
/// struct Door {
///     opened: u32,
/// }
///
/// impl Door {
///     fn closed(&self) -> Behavior<Self> {
///         Behavior::new().on(Pattern::new().atom(KNOCK), |door: &mut Door, ctx, _msg| {
///             door.opened += 1;
///             let next = door.open();
///             ctx.become_(next);
///             Ok(())
///         })
///     }
///
///     fn open(&self) -> Behavior<Self> {
///         Behavior::new().on(Pattern::new().atom(KNOCK), |door: &mut Door, ctx, _msg| {
///             let next = door.closed();
///             ctx.become_(next);
///             Ok(())
///         })
///     }
/// }
///
/// impl StateActor for Door {
///     fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
///         self.closed()
///     }
/// }
/// ```
pub trait StateActor: Sized + Send + 'static {
    /// Build the behavior installed when the actor starts.
    fn init_behavior(&mut self, ctx: &mut ActorContext<Self>) -> Behavior<Self>;

    /// Teardown hook, run first when the actor terminates.
    ///
    /// The default does nothing.
    fn on_exit(&mut self, _ctx: &mut ActorContext<Self>, _reason: ExitReason) {}
}
