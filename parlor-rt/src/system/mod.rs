//! The actor system: configuration, spawning, and lifecycle management.

pub mod actor_system;
pub mod config;
pub mod errors;

pub use actor_system::ActorSystem;
pub use config::{
    SystemConfig, SystemConfigBuilder, DEFAULT_ASK_TIMEOUT, DEFAULT_MAX_ACTORS, DEFAULT_QUANTUM,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use errors::{AskError, SpawnError, SystemError};
