//! Exit reasons and the message shapes of the exit protocol.
//!
//! Three system messages exist, all ordinary two-element tuples so that
//! trapping actors can pattern-match them like any other message:
//!
//! - `('EXIT', reason)` — sent to link partners when an actor dies, and
//!   usable as a kill message by any sender. Intercepted by the dispatcher
//!   before behavior matching unless the receiver traps exits.
//! - `('DOWN', reason)` — delivered once to each monitor when the observed
//!   actor terminates. Never intercepted.
//! - `('EXITED', reason)` — synthesized reply to a synchronous request
//!   whose target terminated before responding.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::message::{Atom, Message, Value};

/// Tag of exit messages.
pub const EXIT: Atom = Atom::from_static("EXIT");

/// Tag of monitor notifications.
pub const DOWN: Atom = Atom::from_static("DOWN");

/// Tag of synthesized replies to requests on terminated actors.
pub const EXITED: Atom = Atom::from_static("EXITED");

/// First wire code available for user-defined exit reasons.
pub const USER_REASON_BASE: u32 = 0x10000;

/// Why an actor terminated.
///
/// Reasons wire-encode to a `u32`: the runtime-defined reasons occupy the
/// reserved range below [`USER_REASON_BASE`], user reasons sit at and above
/// it. `User(0)` is the conventional "user defined" reason.
///
/// # Example
/// ```rust
/// use parlor_rt::supervision::{ExitReason, USER_REASON_BASE};
///
/// assert_eq!(ExitReason::from_code(ExitReason::Normal.code()), Some(ExitReason::Normal));
/// assert_eq!(ExitReason::User(3).code(), USER_REASON_BASE + 3);
/// assert_eq!(ExitReason::from_code(USER_REASON_BASE), Some(ExitReason::User(0)));
/// assert_eq!(ExitReason::from_code(999), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// Clean termination; links ignore it.
    Normal,
    /// A handler returned an error or panicked.
    UnhandledException,
    /// Strict-mode termination: a message matched no clause.
    UnknownMessage,
    /// Untrappable kill, used by system shutdown.
    Kill,
    /// User-defined reason, offset above [`USER_REASON_BASE`].
    User(u32),
}

impl ExitReason {
    /// Conventional user-defined reason (`User(0)`).
    pub const USER_DEFINED: ExitReason = ExitReason::User(0);

    /// The wire code of this reason.
    pub fn code(&self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::UnhandledException => 2,
            Self::UnknownMessage => 3,
            Self::Kill => 4,
            Self::User(offset) => USER_REASON_BASE + offset,
        }
    }

    /// Decode a wire code; `None` for codes outside the defined ranges.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::UnhandledException),
            3 => Some(Self::UnknownMessage),
            4 => Some(Self::Kill),
            c if c >= USER_REASON_BASE => Some(Self::User(c - USER_REASON_BASE)),
            _ => None,
        }
    }
}

impl Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::UnhandledException => write!(f, "unhandled_exception"),
            Self::UnknownMessage => write!(f, "unknown_message"),
            Self::Kill => write!(f, "kill"),
            Self::User(offset) => write!(f, "user({offset})"),
        }
    }
}

/// Build an `('EXIT', reason)` message.
pub fn exit_message(reason: ExitReason) -> Message {
    Message::from_values(vec![Value::Atom(EXIT), Value::from(reason)])
}

/// Build a `('DOWN', reason)` message.
pub fn down_message(reason: ExitReason) -> Message {
    Message::from_values(vec![Value::Atom(DOWN), Value::from(reason)])
}

/// Build an `('EXITED', reason)` message.
pub fn exited_message(reason: ExitReason) -> Message {
    Message::from_values(vec![Value::Atom(EXITED), Value::from(reason)])
}

/// Recognize an exit message and decode its reason.
///
/// A message is an exit message iff it has exactly two elements, the first
/// is the `EXIT` atom, and the second is an unsigned integer holding a
/// valid reason code. Anything else falls through to normal matching.
pub fn exit_reason_of(message: &Message) -> Option<ExitReason> {
    if message.len() != 2 {
        return None;
    }
    if message.get(0).and_then(Value::as_atom) != Some(EXIT) {
        return None;
    }
    let code = message.get(1).and_then(Value::as_uint)?;
    ExitReason::from_code(u32::try_from(code).ok()?)
}
