//! Interpreter configuration
//!
//! Embedders build a config with the builder methods; the `bnx` CLI can also
//! load one from a TOML file:
//!
//! ```toml
//! max_nesting_depth = 32
//! completion_notice = false
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default bound on bracket nesting and sub-program depth
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse interpreter config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for a BlueNexus interpreter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Deepest var-block / paren nesting the lexer accepts, and the deepest
    /// chain of sub-programs the engine will enter
    pub max_nesting_depth: usize,

    /// Print "Program completed." when a run ends cleanly without output
    pub completion_notice: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            completion_notice: true,
        }
    }
}

impl InterpreterConfig {
    pub fn new() -> Self {
        InterpreterConfig::default()
    }

    /// Parse configuration from a TOML string; missing keys keep defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Set the nesting bound (builder pattern); clamped to at least 1
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth.max(1);
        self
    }

    pub fn with_completion_notice(mut self, enabled: bool) -> Self {
        self.completion_notice = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = InterpreterConfig::new();
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert!(config.completion_notice);
    }

    #[test]
    fn test_builder() {
        let config = InterpreterConfig::new()
            .with_max_nesting_depth(0)
            .with_completion_notice(false);
        assert_eq!(config.max_nesting_depth, 1);
        assert!(!config.completion_notice);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = InterpreterConfig::from_toml("max_nesting_depth = 8").unwrap();
        assert_eq!(config.max_nesting_depth, 8);
        assert!(config.completion_notice);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = InterpreterConfig::from_toml("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "completion_notice = false").unwrap();
        let config = InterpreterConfig::load(file.path()).unwrap();
        assert!(!config.completion_notice);
    }

    #[test]
    fn test_load_missing_file() {
        let err = InterpreterConfig::load(Path::new("/nonexistent/bnx.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
