//! Error types for dp-core

use thiserror::Error;

/// Core error type for dfprune
#[derive(Error, Debug)]
pub enum CoreError {
    /// P001: Manifest file not found
    #[error("[P001] Manifest file not found: {path}")]
    ManifestNotFound { path: String },

    /// P002: Manifest file could not be read
    #[error("[P002] Failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// P003: Manifest file is not valid compiler output
    #[error("[P003] Failed to parse manifest '{path}': {message}")]
    ManifestParse { path: String, message: String },

    /// P004: Exclusion pattern is not a valid regular expression
    #[error("[P004] Invalid exclusion pattern '{pattern}': {message}")]
    InvalidExclusionPattern { pattern: String, message: String },

    /// P005: Configuration file not found
    #[error("[P005] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// P006: Failed to parse configuration file
    #[error("[P006] Failed to parse config '{path}': {message}")]
    ConfigParse { path: String, message: String },

    /// P007: Invalid configuration value
    #[error("[P007] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

impl CoreError {
    /// Whether this error means the declared-resource manifest is unusable.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            CoreError::ManifestNotFound { .. }
                | CoreError::ManifestRead { .. }
                | CoreError::ManifestParse { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
