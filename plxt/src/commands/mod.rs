//! Command implementations for the plxt CLI.

pub mod gen;
pub mod parse;
