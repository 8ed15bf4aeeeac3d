//! Application configuration loaded from TOML.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compiler::CompileOptions;

pub const DEFAULT_CONFIG_FILE: &str = "csv_compiler.toml";
pub const CONFIG_ENV_VAR: &str = "CSV_COMPILER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by the command line and the desktop window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default name for the compiled output file.
    pub output_file_name: String,
    /// Parse header rows of all sources concurrently.
    pub parallel_headers: bool,
    /// Per-source size limit in bytes.
    pub max_source_bytes: Option<u64>,
    /// Accepted input extensions; empty accepts everything.
    pub allowed_extensions: Vec<String>,
    /// Rows shown in the preview table.
    pub preview_rows: usize,
    /// Open the saved file with the system default application.
    pub open_after_save: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_file_name: "compiled-data.csv".to_string(),
            parallel_headers: true,
            max_source_bytes: None,
            allowed_extensions: vec!["csv".to_string()],
            preview_rows: 200,
            open_after_save: false,
        }
    }
}

impl AppConfig {
    /// Resolve and load the configuration.
    ///
    /// An explicit path or `CSV_COMPILER_CONFIG` must point at a readable
    /// file. Otherwise `csv_compiler.toml` in the working directory is used
    /// when present, and defaults when not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            parallel_headers: self.parallel_headers,
        }
    }
}
