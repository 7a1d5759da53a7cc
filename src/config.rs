//! Compiler configuration loaded from `opsql.toml`.
//!
//! ```toml
//! [compiler]
//! identifier_quote = "`"
//! placeholder_prefix = "$"
//! placeholder_base = 1
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dialect::Dialect;
use crate::error::{OpsqlError, OpsqlResult};

/// File name searched for in the working directory.
pub const CONFIG_FILE: &str = "opsql.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    compiler: CompilerConfig,
}

/// Identifier and placeholder settings. The default matches
/// [`DefaultDialect`](crate::dialect::DefaultDialect).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub identifier_quote: char,
    pub placeholder_prefix: String,
    /// Number added to the zero-based binding index. `1` suits drivers
    /// that count `$1, $2, ...`.
    pub placeholder_base: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            identifier_quote: '"',
            placeholder_prefix: "$".to_string(),
            placeholder_base: 0,
        }
    }
}

impl CompilerConfig {
    /// Parse a TOML document with a `[compiler]` table.
    pub fn from_toml(content: &str) -> OpsqlResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.compiler.validate()?;
        Ok(file.compiler)
    }

    /// Load from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> OpsqlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading compiler config");
        Self::from_toml(&content)
    }

    /// Look for `./opsql.toml`, then `<config dir>/opsql/config.toml`;
    /// fall back to defaults when neither exists.
    pub fn discover() -> OpsqlResult<Self> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("opsql").join("config.toml"));
        }
        paths
    }

    fn validate(&self) -> OpsqlResult<()> {
        if self.placeholder_prefix.is_empty() {
            return Err(OpsqlError::Config(
                "placeholder_prefix must not be empty".to_string(),
            ));
        }
        if self.identifier_quote.is_whitespace() {
            return Err(OpsqlError::Config(
                "identifier_quote must be a visible character".to_string(),
            ));
        }
        Ok(())
    }
}

impl Dialect for CompilerConfig {
    fn identifier_wrapper(&self) -> char {
        self.identifier_quote
    }

    fn placeholder(&self, index: usize) -> String {
        format!("{}{}", self.placeholder_prefix, index + self.placeholder_base)
    }
}
