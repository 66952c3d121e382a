//! Utility types shared across the runtime.

pub mod ids;

pub use ids::{ActorId, RequestId};
