//! Generated artefacts.
//!
//! The persisted state of one generator run: the minimised DFA record and
//! the parse-table record. Encoding is structural JSON; round-trip
//! equality is a tested property, not a promise.

use plx_lex::Dfa;
use plx_par::{Production, SlrTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors while persisting or loading artefacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ArtifactError.
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// The parse-table record: ACTION/GOTO (with recorded conflicts) plus the
/// enumerated productions, index 0 reserved for the augmented one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TablesArtifact {
    pub table: SlrTable,
    pub productions: Vec<Production>,
}

/// Writes the DFA record.
pub fn save_dfa(path: &Path, dfa: &Dfa) -> Result<()> {
    write_json(path, dfa)
}

/// Reads a DFA record back.
pub fn load_dfa(path: &Path) -> Result<Dfa> {
    read_json(path)
}

/// Writes the parse-table record.
pub fn save_tables(path: &Path, tables: &TablesArtifact) -> Result<()> {
    write_json(path, tables)
}

/// Reads a parse-table record back.
pub fn load_tables(path: &Path) -> Result<TablesArtifact> {
    read_json(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let encoded = serde_json::to_string_pretty(value)?;
    fs::write(path, encoded)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
