//! Message model: atoms, tagged values, tuple messages, and envelopes.

pub mod atom;
pub mod envelope;
pub mod tuple;
pub mod value;

pub use atom::{Atom, AtomError, MAX_ATOM_LEN};
pub use envelope::{Correlation, Envelope};
pub use tuple::Message;
pub use value::{Value, ValueKind};
