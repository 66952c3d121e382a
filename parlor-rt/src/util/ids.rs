// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Process-wide actor id counter. Ids start at 1; 0 is never assigned.
static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for actors in the system.
///
/// Ids are assigned from a process-local monotonically increasing counter
/// at actor creation and are never reused, so an `ActorId` remains a valid
/// identity probe after the actor has terminated.
///
/// # Example
/// ```rust
/// use parlor_rt::util::ActorId;
///
/// let id1 = ActorId::next();
/// let id2 = ActorId::next();
/// assert!(id2 > id1); // Strictly increasing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Allocate the next actor id.
    pub fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value of this id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Correlation identifier for synchronous requests.
///
/// Every `sync_send` tags its request with a fresh `RequestId`; the reply
/// carries the same id so the requester can match the response against the
/// request it is awaiting. Responses with unknown ids are dropped.
///
/// # Example
/// ```rust
/// use parlor_rt::util::RequestId;
///
/// let id1 = RequestId::new();
/// let id2 = RequestId::new();
/// assert_ne!(id1, id2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new unique request id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
