//! plx-util - Core Utilities and Foundation Types
//!
//! Shared foundation for the plx generator crates: source spans for
//! spec-file diagnostics, the diagnostic types themselves, and the hash
//! map defaults the phase crates agree on.
//!
//! The generator pipeline is single-threaded and synchronous; nothing in
//! this crate is `Sync`-hardened on purpose. Every artefact-facing table
//! in the phase crates uses ordered maps so that two runs over the same
//! specification produce byte-identical output, and this crate re-exports
//! the fast unordered maps reserved for interior lookup state.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::Span;

/// Fast hash map for interior lookup state (never serialised).
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Fast hash set for interior lookup state (never serialised).
pub type FxHashSet<K> = rustc_hash::FxHashSet<K>;
