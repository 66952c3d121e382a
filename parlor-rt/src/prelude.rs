//! Convenience re-exports for the common case.
//!
//! ```rust
//! use parlor_rt::prelude::*;
//! ```

pub use crate::actor::{ActorContext, ActorFactory, Address, ResponseHandle, StateActor};
pub use crate::behavior::{Behavior, ElementPattern, HandlerError, Pattern};
pub use crate::message::{Atom, Message, Value, ValueKind};
pub use crate::msg;
pub use crate::supervision::ExitReason;
pub use crate::system::{ActorSystem, AskError, SpawnError, SystemConfig, SystemError};
pub use crate::util::{ActorId, RequestId};
