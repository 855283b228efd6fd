//! Configuration module for the plxt CLI.
//!
//! Loads `plxt.toml` from an explicit path, the current directory, or the
//! user config directory. Every field has a serde default so a partial
//! file works; CLI flags override file values.

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "plxt.toml";

/// Application configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Global verbose setting.
    #[serde(default)]
    pub verbose: bool,

    /// Default output directory for artefacts and dumps.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Gen-specific configuration.
    #[serde(default)]
    pub gen: GenConfig,

    /// Parse-specific configuration.
    #[serde(default)]
    pub parse: ParseConfig,
}

/// Gen-specific configuration options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenConfig {
    /// Opt into the `general`/`p` list-start wrapping of the grammar
    /// loader.
    #[serde(default)]
    pub wrap_listy_start: bool,
}

/// Parse-specific configuration options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseConfig {
    /// Print the shift/reduce trace after a run.
    #[serde(default = "default_true")]
    pub trace: bool,

    /// Extend the error-recovery sync set with FOLLOW of the stacked
    /// non-terminals.
    #[serde(default)]
    pub follow_sync: bool,
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            output_dir: default_output_dir(),
            gen: GenConfig::default(),
            parse: ParseConfig::default(),
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            wrap_listy_start: false,
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            trace: true,
            follow_sync: false,
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// Resolution order: the explicit path when given, `./plxt.toml`,
    /// then `<config-dir>/plxt/plxt.toml`. Defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            let text = std::fs::read_to_string(path)?;
            return Ok(toml::from_str(&text)?);
        }
        for candidate in Self::search_paths() {
            if candidate.exists() {
                let text = std::fs::read_to_string(&candidate)?;
                return Ok(toml::from_str(&text)?);
            }
        }
        Ok(Config::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(base) = config_dir() {
            paths.push(base.join("plxt").join(CONFIG_FILE_NAME));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.verbose);
        assert_eq!(config.output_dir, "out");
        assert!(!config.gen.wrap_listy_start);
        assert!(config.parse.trace);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("verbose = true\n").unwrap();
        assert!(config.verbose);
        assert_eq!(config.output_dir, "out");
        assert!(config.parse.trace);
    }

    #[test]
    fn test_nested_tables() {
        let config: Config = toml::from_str(
            "[gen]\nwrap_listy_start = true\n\n[parse]\ntrace = false\n",
        )
        .unwrap();
        assert!(config.gen.wrap_listy_start);
        assert!(!config.parse.trace);
    }

    #[test]
    fn test_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let reparsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(config, reparsed);
    }
}
