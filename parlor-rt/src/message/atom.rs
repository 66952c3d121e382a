//! Compact interned identifiers for small symbolic message tags.
//!
//! An [`Atom`] is at most [`MAX_ATOM_LEN`] characters drawn from a
//! 64-symbol alphabet (`_`, `0-9`, `A-Z`, `a-z`), packed six bits per
//! character into a single `u64`. Two atoms built from the same text are
//! bit-identical, so comparing atoms is a single integer comparison and no
//! process-wide intern table is needed.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Maximum number of characters in an atom.
pub const MAX_ATOM_LEN: usize = 10;

/// Errors from checked atom construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtomError {
    /// The text exceeds [`MAX_ATOM_LEN`] characters.
    #[error("atom text is too long ({len} > {MAX_ATOM_LEN})")]
    TooLong { len: usize },

    /// The text contains a character outside `_`, `0-9`, `A-Z`, `a-z`.
    #[error("invalid atom character {ch:?}")]
    InvalidChar { ch: char },
}

/// A small interned symbolic tag, matchable by value.
///
/// Atoms name message kinds the way enum discriminants would, without a
/// shared enum: `("push", 7)`, `("pop",)`, `("ok", 3)`. The text is encoded
/// into the atom's bits, so equality and hashing are integer operations and
/// the same text always produces the same atom.
///
/// # Example
/// ```rust
/// use parlor_rt::message::Atom;
///
/// const PUSH: Atom = Atom::from_static("push");
///
/// let push = Atom::try_new("push").unwrap();
/// assert_eq!(push, PUSH);
/// assert_eq!(push.text(), "push");
///
/// assert!(Atom::try_new("way_too_long_tag").is_err());
/// assert!(Atom::try_new("no spaces").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom(u64);

/// Map a byte to its 6-bit code, or -1 if it is not in the alphabet.
/// Code 0 is reserved as padding so shorter atoms stay unique.
const fn char_code(b: u8) -> i8 {
    match b {
        b'_' => 1,
        b'0'..=b'9' => (b - b'0' + 2) as i8,
        b'A'..=b'Z' => (b - b'A' + 12) as i8,
        b'a'..=b'z' => (b - b'a' + 38) as i8,
        _ => -1,
    }
}

/// Inverse of [`char_code`]. Only called with codes 1..=63.
const fn code_char(code: u8) -> u8 {
    match code {
        1 => b'_',
        2..=11 => b'0' + (code - 2),
        12..=37 => b'A' + (code - 12),
        _ => b'a' + (code - 38),
    }
}

impl Atom {
    /// Build an atom from a string literal, validated at compile time.
    ///
    /// Intended for `const` contexts; invalid text fails compilation when
    /// used in one. Prefer [`Atom::try_new`] for runtime strings.
    ///
    /// # Panics
    ///
    /// Panics if the text is longer than [`MAX_ATOM_LEN`] or contains a
    /// character outside the atom alphabet.
    #[allow(clippy::panic)] // compile-time validation for const contexts
    pub const fn from_static(text: &'static str) -> Self {
        let bytes = text.as_bytes();
        if bytes.len() > MAX_ATOM_LEN {
            panic!("atom text is too long");
        }
        let mut value = 0u64;
        let mut i = 0;
        while i < bytes.len() {
            let code = char_code(bytes[i]);
            if code < 0 {
                panic!("invalid atom character");
            }
            value = (value << 6) | code as u64;
            i += 1;
        }
        Self(value)
    }

    /// Build an atom from arbitrary text, rejecting invalid input.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::TooLong`] or [`AtomError::InvalidChar`].
    pub fn try_new(text: &str) -> Result<Self, AtomError> {
        let bytes = text.as_bytes();
        if bytes.len() > MAX_ATOM_LEN {
            return Err(AtomError::TooLong { len: bytes.len() });
        }
        let mut value = 0u64;
        for &b in bytes {
            let code = char_code(b);
            if code < 0 {
                return Err(AtomError::InvalidChar { ch: b as char });
            }
            value = (value << 6) | code as u64;
        }
        Ok(Self(value))
    }

    /// Decode the atom back to its text.
    pub fn text(&self) -> String {
        let mut buf = [0u8; MAX_ATOM_LEN];
        let mut n = self.0;
        let mut len = 0;
        while n != 0 {
            buf[len] = code_char((n & 0x3f) as u8);
            len += 1;
            n >>= 6;
        }
        buf[..len].iter().rev().map(|&b| b as char).collect()
    }

    /// Get the packed representation.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text())
    }
}
