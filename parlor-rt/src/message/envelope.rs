//! Message envelopes: payload plus delivery metadata.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::tuple::Message;
use crate::actor::Address;
use crate::util::RequestId;

/// Request/response correlation attached to an envelope.
///
/// A synchronous request carries `Request(id)`; the matching reply carries
/// `Response(id)` with the same id. Plain asynchronous messages carry no
/// correlation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// This envelope asks for a correlated reply.
    Request(RequestId),
    /// This envelope is the correlated reply.
    Response(RequestId),
}

/// A message in flight: payload, optional sender, optional correlation.
///
/// # Example
/// ```rust
/// use parlor_rt::msg;
/// use parlor_rt::message::Envelope;
///
/// let env = Envelope::new(msg![1, 2]);
/// assert!(env.sender.is_none());
/// assert!(env.correlation.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The message payload.
    pub message: Message,

    /// Sender address, if the message originated inside an actor.
    pub sender: Option<Address>,

    /// Request/response correlation, if any.
    pub correlation: Option<Correlation>,

    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Create an envelope with no sender and no correlation.
    pub fn new(message: Message) -> Self {
        Self {
            message,
            sender: None,
            correlation: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set the sender address.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Builder method: mark this envelope as a synchronous request.
    pub fn as_request(mut self, id: RequestId) -> Self {
        self.correlation = Some(Correlation::Request(id));
        self
    }

    /// Builder method: mark this envelope as the reply to `id`.
    pub fn as_response(mut self, id: RequestId) -> Self {
        self.correlation = Some(Correlation::Response(id));
        self
    }

    /// The request id, if this envelope is a synchronous request.
    pub fn request_id(&self) -> Option<RequestId> {
        match self.correlation {
            Some(Correlation::Request(id)) => Some(id),
            _ => None,
        }
    }

    /// The response id, if this envelope is a correlated reply.
    pub fn response_id(&self) -> Option<RequestId> {
        match self.correlation {
            Some(Correlation::Response(id)) => Some(id),
            _ => None,
        }
    }
}
