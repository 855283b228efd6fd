//! Regex alphabet symbols.
//!
//! The normalised regex ranges over a mixed alphabet: input bytes, opaque
//! byte classes, the empty string, and accepting markers. Internally these
//! are always the typed [`Symbol`]; the decimal string rendering exists for
//! inspection and dumps only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// First marker id. Every decimal token >= this value in a normalised
/// regex tags an accepting alternative rather than an input byte.
pub const MARKER_BASE: u32 = 1000;

/// One symbol of the regex alphabet.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// A single input byte, stored by code.
    Byte(u8),
    /// An opaque byte class: complement or set-difference expansion, or
    /// the `_` wildcard. Kept atomic through every pass.
    Union(BTreeSet<u8>),
    /// The empty string `λ`.
    Epsilon,
    /// Accepting marker for one rule alternative (>= [`MARKER_BASE`]).
    Marker(u32),
}

impl Symbol {
    /// Whether this symbol is an accepting marker.
    #[inline]
    pub fn is_marker(&self) -> bool {
        matches!(self, Symbol::Marker(_))
    }

    /// The marker id, if this is a marker.
    #[inline]
    pub fn marker(&self) -> Option<u32> {
        match self {
            Symbol::Marker(m) => Some(*m),
            _ => None,
        }
    }

    /// Whether this symbol is the empty string.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Whether a leaf carrying this symbol consumes `byte`.
    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        match self {
            Symbol::Byte(b) => *b == byte,
            Symbol::Union(set) => set.contains(&byte),
            Symbol::Epsilon | Symbol::Marker(_) => false,
        }
    }

    /// The input bytes this symbol can consume. Empty for `λ` and markers.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Symbol::Byte(b) => vec![*b],
            Symbol::Union(set) => set.iter().copied().collect(),
            Symbol::Epsilon | Symbol::Marker(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Symbol {
    /// Renders the boundary string form: decimal codes, `λ`, marker ids,
    /// and `$…$` for opaque classes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Byte(b) => write!(f, "{b}"),
            Symbol::Marker(m) => write!(f, "{m}"),
            Symbol::Epsilon => write!(f, "λ"),
            Symbol::Union(set) => {
                write!(f, "$")?;
                for (i, b) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{b}")?;
                }
                write!(f, "$")
            }
        }
    }
}
