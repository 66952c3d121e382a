//! Clauses: a pattern paired with a handler closure.

// Layer 1: Standard library imports
use std::error::Error;
use std::fmt;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::pattern::Pattern;
use crate::actor::ActorContext;
use crate::message::Message;

/// Error returned by a message handler.
///
/// A handler error terminates the actor with reason `unhandled_exception`
/// and fans out through links and monitors like any other death. Handlers
/// that can recover should do so themselves and return `Ok`.
///
/// # Example
/// ```rust
/// use parlor_rt::behavior::HandlerError;
///
/// let err = HandlerError::new("downstream unavailable");
/// assert_eq!(err.to_string(), "downstream unavailable");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl HandlerError {
    /// Create an error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A message handler over the actor's state and context.
pub type Handler<S> =
    Box<dyn FnMut(&mut S, &mut ActorContext<S>, &Message) -> Result<(), HandlerError> + Send>;

/// A timeout handler; fires without a message.
pub type TimeoutHandler<S> =
    Box<dyn FnMut(&mut S, &mut ActorContext<S>) -> Result<(), HandlerError> + Send>;

/// One (pattern, handler) pair of a behavior.
pub struct Clause<S> {
    pub(crate) pattern: Pattern,
    pub(crate) handler: Handler<S>,
}

impl<S> Clause<S> {
    /// Create a clause from a pattern and a handler.
    pub fn new(
        pattern: Pattern,
        handler: impl FnMut(&mut S, &mut ActorContext<S>, &Message) -> Result<(), HandlerError>
            + Send
            + 'static,
    ) -> Self {
        Self {
            pattern,
            handler: Box::new(handler),
        }
    }

    /// The clause's pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl<S> fmt::Debug for Clause<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
