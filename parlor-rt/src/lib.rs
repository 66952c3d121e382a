//! # parlor-rt - Event-Based Actor Runtime
//!
//! Actors with pattern-matched tuple messages, behavior stacks, timeouts,
//! links/monitors with an exit protocol, delayed send, and synchronous
//! request/reply, scheduled cooperatively on top of Tokio.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parlor_rt::prelude::*;
//!
//! const GET: Atom = Atom::from_static("get");
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! impl StateActor for Counter {
//!     fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
//!         Behavior::new()
//!             .on(Pattern::new().any(ValueKind::Int), |counter, _ctx, msg| {
//!                 counter.count += msg.get(0).and_then(|v| v.as_int()).unwrap_or(0);
//!                 Ok(())
//!             })
//!             .on(Pattern::new().atom(GET), |counter, ctx, _msg| {
//!                 ctx.reply(msg![counter.count]);
//!                 Ok(())
//!             })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::new(SystemConfig::default())?;
//!     let counter = system.spawn(Counter { count: 0 })?;
//!
//!     system.send(&counter, msg![5]);
//!     system.send(&counter, msg![37]);
//!     let reply = system.ask(&counter, msg![GET]).await?;
//!     assert_eq!(reply, msg![42]);
//!
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Core Concepts
//!
//! ## Messages
//! A message is an immutable tuple of tagged values ([`message::Value`]):
//! integers, floats, booleans, strings, [`message::Atom`] tags, and actor
//! addresses. Build one with [`msg!`].
//!
//! ## Behaviors
//! A [`behavior::Behavior`] is an ordered list of (pattern, handler)
//! clauses plus an optional `others` catch-all and an optional timeout
//! clause. Clauses are tried top to bottom; messages no clause accepts are
//! set aside in the mailbox's skip cache and re-examined on the next
//! receive attempt, after the next `become`. Handlers receive the actor's
//! state and an [`actor::ActorContext`] carrying every operation: `reply`,
//! `become_`, `quit`, `link_to`, `monitor`, `sync_send`, and friends.
//!
//! ## Scheduling
//! One task per actor on the hosting Tokio runtime: at most one worker
//! ever executes a given actor, handlers run to completion, and a bounded
//! quantum of messages per turn keeps actors from starving each other.
//!
//! ## Supervision
//! Links are symmetric: when a linked actor dies with reason `R`, its
//! partners receive `('EXIT', R)` — trapped as an ordinary message when
//! [`actor::ActorContext::trap_exit`] is set, fatal otherwise (reason
//! `normal` is ignored). Monitors are directed and deliver a single
//! `('DOWN', R)`. Synchronous requesters of a dead actor receive
//! `('EXITED', R)`.
//!
//! # Module Organization
//!
//! - [`message`] - Atoms, values, tuple messages, envelopes
//! - [`behavior`] - Patterns, clauses, behavior builder
//! - [`mailbox`] - FIFO queue with the skip cache
//! - [`actor`] - Addresses, handler context, spawning styles
//! - [`supervision`] - Exit reasons and the exit protocol messages
//! - [`system`] - `ActorSystem`, configuration, lifecycle
//! - [`util`] - Actor and request ids

pub mod actor;
pub mod behavior;
pub mod mailbox;
pub mod message;
pub mod prelude;
pub mod supervision;
pub mod system;
mod timer;
pub mod util;

// Re-export commonly used types
pub use actor::{ActorContext, ActorFactory, Address, ResponseHandle, StateActor};
pub use behavior::{Behavior, Clause, ElementPattern, HandlerError, Pattern};
pub use mailbox::{Mailbox, MailboxMetrics, MailboxSender};
pub use message::{Atom, AtomError, Correlation, Envelope, Message, Value, ValueKind};
pub use supervision::ExitReason;
pub use system::{ActorSystem, AskError, SpawnError, SystemConfig, SystemError};
pub use util::{ActorId, RequestId};
