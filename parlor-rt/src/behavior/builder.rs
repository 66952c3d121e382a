//! The behavior type: ordered clauses, an optional `others` clause, and an
//! optional timeout clause.
//!
//! Clauses are tried top to bottom in builder order; the first clause whose
//! pattern accepts the message wins. The `others` clause, when present,
//! ranks after every explicit clause and accepts any message. The timeout
//! clause is never tried against a message: it fires only when no clause
//! matched within the timeout, measured from the moment the behavior
//! became active or the last handler ran.

// Layer 1: Standard library imports
use std::fmt;
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::clause::{Clause, Handler, HandlerError, TimeoutHandler};
use super::pattern::Pattern;
use crate::actor::ActorContext;
use crate::message::Message;

/// Which clause of a behavior matched a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClauseIndex {
    /// An explicit clause, by position.
    At(usize),
    /// The `others` clause.
    Others,
}

/// A set of message clauses plus an optional timeout, installable on an
/// actor via `become`.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use parlor_rt::behavior::{Behavior, Pattern};
/// use parlor_rt::message::ValueKind;
///
/// struct Counter {
///     count: i64,
/// }
///
/// let behavior = Behavior::<Counter>::new()
///     .on(Pattern::new().any(ValueKind::Int), |state, _ctx, msg| {
///         state.count += msg.get(0).and_then(|v| v.as_int()).unwrap_or(0);
///         Ok(())
///     })
///     .others(|_state, _ctx, _msg| Ok(()))
///     .after(Duration::from_millis(100), |_state, ctx| {
///         ctx.quit(parlor_rt::supervision::ExitReason::Normal);
///         Ok(())
///     });
///
/// assert_eq!(behavior.clause_count(), 1);
/// assert!(behavior.has_others());
/// assert!(behavior.has_timeout());
/// ```
pub struct Behavior<S> {
    clauses: Vec<Clause<S>>,
    others: Option<Handler<S>>,
    timeout: Option<(Duration, TimeoutHandler<S>)>,
}

impl<S> Behavior<S> {
    /// An empty behavior. A behavior with no clauses and no timeout never
    /// handles anything; add clauses before installing it.
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            others: None,
            timeout: None,
        }
    }

    /// Append a clause. Clauses are tried in the order they were added.
    pub fn on(
        mut self,
        pattern: Pattern,
        handler: impl FnMut(&mut S, &mut ActorContext<S>, &Message) -> Result<(), HandlerError>
            + Send
            + 'static,
    ) -> Self {
        self.clauses.push(Clause::new(pattern, handler));
        self
    }

    /// Install the catch-all clause, tried after every explicit clause.
    pub fn others(
        mut self,
        handler: impl FnMut(&mut S, &mut ActorContext<S>, &Message) -> Result<(), HandlerError>
            + Send
            + 'static,
    ) -> Self {
        self.others = Some(Box::new(handler));
        self
    }

    /// Install the timeout clause.
    pub fn after(
        mut self,
        timeout: Duration,
        handler: impl FnMut(&mut S, &mut ActorContext<S>) -> Result<(), HandlerError> + Send + 'static,
    ) -> Self {
        self.timeout = Some((timeout, Box::new(handler)));
        self
    }

    /// Number of explicit clauses.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Whether a catch-all clause is installed.
    pub fn has_others(&self) -> bool {
        self.others.is_some()
    }

    /// Whether a timeout clause is installed.
    pub fn has_timeout(&self) -> bool {
        self.timeout.is_some()
    }

    /// The timeout duration, if a timeout clause is installed.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.as_ref().map(|(duration, _)| *duration)
    }

    /// Find the first clause accepting `message`, falling back to `others`.
    pub(crate) fn matching_clause(&self, message: &Message) -> Option<ClauseIndex> {
        for (index, clause) in self.clauses.iter().enumerate() {
            if clause.pattern.matches(message) {
                return Some(ClauseIndex::At(index));
            }
        }
        if self.others.is_some() {
            return Some(ClauseIndex::Others);
        }
        None
    }

    /// Run the handler of a previously matched clause.
    pub(crate) fn invoke(
        &mut self,
        index: ClauseIndex,
        state: &mut S,
        ctx: &mut ActorContext<S>,
        message: &Message,
    ) -> Result<(), HandlerError> {
        match index {
            ClauseIndex::At(i) => match self.clauses.get_mut(i) {
                Some(clause) => (clause.handler)(state, ctx, message),
                None => Err(HandlerError::new("matched clause disappeared")),
            },
            ClauseIndex::Others => match self.others.as_mut() {
                Some(handler) => handler(state, ctx, message),
                None => Err(HandlerError::new("matched clause disappeared")),
            },
        }
    }

    /// Run the timeout handler, if one is installed.
    pub(crate) fn invoke_timeout(
        &mut self,
        state: &mut S,
        ctx: &mut ActorContext<S>,
    ) -> Result<(), HandlerError> {
        match self.timeout.as_mut() {
            Some((_, handler)) => handler(state, ctx),
            None => Ok(()),
        }
    }
}

impl<S> Default for Behavior<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Behavior<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("clauses", &self.clauses.len())
            .field("others", &self.others.is_some())
            .field("timeout", &self.timeout_duration())
            .finish()
    }
}
