//! Element patterns: the predicate half of a clause.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::{Atom, Message, Value, ValueKind};

/// Predicate over one message element.
///
/// - `Any(kind)` is the typed wildcard: it accepts every value of the
///   given kind and binds it to the handler through the message argument.
/// - `Literal(value)` accepts exactly that value, by structural equality.
///
/// Atom literals are common enough to have their own constructor, but they
/// are plain literals underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPattern {
    /// Typed wildcard; matches any value of the kind.
    Any(ValueKind),
    /// Exact value, matched by equality.
    Literal(Value),
}

impl ElementPattern {
    /// Typed wildcard for `kind`.
    pub fn any(kind: ValueKind) -> Self {
        Self::Any(kind)
    }

    /// Literal element, converted with `Value::from`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Atom literal element.
    pub fn atom(atom: Atom) -> Self {
        Self::Literal(Value::Atom(atom))
    }

    /// Whether this pattern accepts `value`.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Any(kind) => value.kind() == *kind,
            Self::Literal(expected) => value == expected,
        }
    }
}

/// Ordered element-pattern list over a whole message.
///
/// A pattern matches a message iff the arities are equal and every element
/// pattern accepts the value at its position. The empty pattern matches
/// exactly the empty message.
///
/// # Example
/// ```rust
/// use parlor_rt::msg;
/// use parlor_rt::behavior::Pattern;
/// use parlor_rt::message::{Atom, ValueKind};
///
/// const PUSH: Atom = Atom::from_static("push");
///
/// let pattern = Pattern::new().atom(PUSH).any(ValueKind::Int);
/// assert!(pattern.matches(&msg![PUSH, 7]));
/// assert!(!pattern.matches(&msg![PUSH, "seven"]));
/// assert!(!pattern.matches(&msg![PUSH]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    elements: Vec<ElementPattern>,
}

impl Pattern {
    /// The empty pattern (matches the empty message); extend with the
    /// builder methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern from explicit element patterns.
    pub fn of(elements: impl Into<Vec<ElementPattern>>) -> Self {
        Self {
            elements: elements.into(),
        }
    }

    /// Append a literal element.
    pub fn literal(mut self, value: impl Into<Value>) -> Self {
        self.elements.push(ElementPattern::literal(value));
        self
    }

    /// Append a typed wildcard.
    pub fn any(mut self, kind: ValueKind) -> Self {
        self.elements.push(ElementPattern::Any(kind));
        self
    }

    /// Append an atom literal.
    pub fn atom(mut self, atom: Atom) -> Self {
        self.elements.push(ElementPattern::atom(atom));
        self
    }

    /// Number of elements this pattern requires.
    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    /// Whether this pattern accepts `message`.
    pub fn matches(&self, message: &Message) -> bool {
        if message.len() != self.elements.len() {
            return false;
        }
        self.elements
            .iter()
            .zip(message.iter())
            .all(|(pattern, value)| pattern.matches(value))
    }
}
