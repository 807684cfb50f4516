//! Configuration types and parsing for dfprune.yml

use crate::error::{CoreError, CoreResult};
use crate::exclusion::ExclusionRule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dfprune.yml";

/// Top-level configuration from dfprune.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Warehouse connection settings
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Tables that are never reported
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Compiler invocation used by `--compile`
    #[serde(default)]
    pub compile: CompileConfig,
}

/// Warehouse backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseType {
    /// Google BigQuery (default)
    #[default]
    BigQuery,
    /// DuckDB database file with optional attached catalogs
    DuckDb,
}

impl std::fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarehouseType::BigQuery => write!(f, "bigquery"),
            WarehouseType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub warehouse_type: WarehouseType,

    /// BigQuery REST API root
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding a BigQuery OAuth access token
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// DuckDB database path (or :memory:)
    #[serde(default = "default_duckdb_path")]
    pub path: String,

    /// DuckDB catalogs to attach: alias -> database file
    #[serde(default)]
    pub attach: IndexMap<String, String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            warehouse_type: WarehouseType::default(),
            endpoint: default_endpoint(),
            access_token_env: default_access_token_env(),
            path: default_duckdb_path(),
            attach: IndexMap::new(),
        }
    }
}

/// Exclusion settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
    /// Exact table names
    #[serde(default)]
    pub names: Vec<String>,

    /// Regex patterns matched against table names
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// External compiler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileConfig {
    /// Program to run
    #[serde(default = "default_compile_command")]
    pub command: String,

    /// Arguments passed to the program
    #[serde(default = "default_compile_args")]
    pub args: Vec<String>,

    /// Working directory for the compiler (defaults to the current directory)
    #[serde(default)]
    pub project_dir: Option<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            command: default_compile_command(),
            args: default_compile_args(),
            project_dir: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

fn default_access_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

fn default_duckdb_path() -> String {
    ":memory:".to_string()
}

fn default_compile_command() -> String {
    "dataform".to_string()
}

fn default_compile_args() -> Vec<String> {
    vec!["compile".to_string(), "--json".to_string()]
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or `dfprune.yml` from `dir` when present.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CoreResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = dir.join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    log::debug!(
                        "No {} in {}, using defaults",
                        DEFAULT_CONFIG_FILE,
                        dir.display()
                    );
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.compile.command.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "compile.command cannot be empty".to_string(),
            });
        }

        if self.warehouse.attach.keys().any(|alias| alias.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "warehouse.attach aliases cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Build the exclusion rule from the config file plus command-line additions.
    ///
    /// CLI names are added to the configured names and the CLI pattern is
    /// appended after the configured patterns.
    pub fn exclusion_rule(
        &self,
        extra_names: &[String],
        extra_pattern: Option<&str>,
    ) -> ExclusionRule {
        let mut rule = ExclusionRule::new().with_names(self.exclude.names.iter().cloned());
        for pattern in &self.exclude.patterns {
            rule.add_pattern(pattern.clone());
        }
        for name in extra_names {
            rule.add_name(name.clone());
        }
        if let Some(pattern) = extra_pattern {
            rule.add_pattern(pattern);
        }
        rule
    }

    /// Compiler working directory resolved against `base`
    pub fn compile_dir(&self, base: &Path) -> PathBuf {
        match &self.compile.project_dir {
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
