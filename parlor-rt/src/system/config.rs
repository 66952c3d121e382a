//! System configuration with sensible defaults.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::errors::SystemError;

/// Default number of messages an actor may process per scheduling turn.
pub const DEFAULT_QUANTUM: usize = 8;

/// Default timeout for [`ActorSystem::ask`](super::ActorSystem::ask).
pub const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for graceful system shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum concurrent actors (0 = unlimited).
pub const DEFAULT_MAX_ACTORS: usize = 0;

/// System-wide configuration for the actor runtime.
///
/// # Examples
///
/// ```rust
/// use parlor_rt::system::{SystemConfig, DEFAULT_QUANTUM};
/// use std::time::Duration;
///
/// let config = SystemConfig::default();
/// assert_eq!(config.quantum, DEFAULT_QUANTUM);
///
/// let config = SystemConfig::builder()
///     .with_quantum(16)
///     .with_shutdown_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(config.quantum, 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Intended worker pool size; defaults to hardware concurrency.
    ///
    /// The runtime schedules actors onto the hosting tokio runtime, so
    /// this value sizes the runtime for embedders that build one from the
    /// configuration rather than resizing an existing pool.
    pub worker_threads: usize,

    /// Messages an actor may process per scheduling turn before its task
    /// yields to the worker.
    pub quantum: usize,

    /// Terminate actors with reason `unknown_message` when a message
    /// matches no clause, instead of keeping it in the skip cache.
    pub strict_unmatched: bool,

    /// Maximum concurrent actors (0 = unlimited).
    pub max_actors: usize,

    /// How long `ask` waits for a reply.
    pub ask_timeout: Duration,

    /// How long graceful shutdown waits for actors to finish.
    pub shutdown_timeout: Duration,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            quantum: DEFAULT_QUANTUM,
            strict_unmatched: false,
            max_actors: DEFAULT_MAX_ACTORS,
            ask_timeout: DEFAULT_ASK_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl SystemConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidConfig`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.worker_threads == 0 {
            return Err(SystemError::InvalidConfig(
                "worker_threads must be > 0".into(),
            ));
        }
        if self.quantum == 0 {
            return Err(SystemError::InvalidConfig("quantum must be > 0".into()));
        }
        if self.ask_timeout.is_zero() {
            return Err(SystemError::InvalidConfig("ask_timeout must be > 0".into()));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(SystemError::InvalidConfig(
                "shutdown_timeout must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`SystemConfig`] with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct SystemConfigBuilder {
    worker_threads: Option<usize>,
    quantum: Option<usize>,
    strict_unmatched: Option<bool>,
    max_actors: Option<usize>,
    ask_timeout: Option<Duration>,
    shutdown_timeout: Option<Duration>,
}

impl SystemConfigBuilder {
    /// Set the intended worker pool size.
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    /// Set the per-turn message quantum.
    pub fn with_quantum(mut self, quantum: usize) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Enable or disable strict unmatched-message handling.
    pub fn with_strict_unmatched(mut self, strict: bool) -> Self {
        self.strict_unmatched = Some(strict);
        self
    }

    /// Set the maximum number of concurrent actors (0 = unlimited).
    pub fn with_max_actors(mut self, max: usize) -> Self {
        self.max_actors = Some(max);
        self
    }

    /// Set the `ask` timeout.
    pub fn with_ask_timeout(mut self, timeout: Duration) -> Self {
        self.ask_timeout = Some(timeout);
        self
    }

    /// Set the graceful shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidConfig`] when a value is out of range.
    pub fn build(self) -> Result<SystemConfig, SystemError> {
        let defaults = SystemConfig::default();
        let config = SystemConfig {
            worker_threads: self.worker_threads.unwrap_or(defaults.worker_threads),
            quantum: self.quantum.unwrap_or(defaults.quantum),
            strict_unmatched: self.strict_unmatched.unwrap_or(defaults.strict_unmatched),
            max_actors: self.max_actors.unwrap_or(defaults.max_actors),
            ask_timeout: self.ask_timeout.unwrap_or(defaults.ask_timeout),
            shutdown_timeout: self.shutdown_timeout.unwrap_or(defaults.shutdown_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}
