//! Unified error types for mycnf.
//!
//! This module provides a central `MycnfError` enum that covers the main
//! error categories across the codebase, enabling consistent `Result`-based
//! error propagation with the `?` operator.

use std::fmt;

/// Central error type for mycnf operations.
#[derive(Debug)]
pub enum MycnfError {
    /// I/O errors (reading or writing option files, schema files).
    Io(std::io::Error),
    /// The field schema could not be loaded or is inconsistent.
    Schema(String),
    /// Runtime configuration errors (user preference file).
    Config(String),
    /// Serialization/deserialization errors (TOML, JSON).
    Serialization(String),
    /// A (section, key) pair that the schema does not declare.
    UnknownField {
        /// Section name as given by the caller.
        section: String,
        /// Key as given by the caller.
        key: String,
    },
    /// A required field cannot be disabled.
    RequiredField {
        /// Section name as given by the caller.
        section: String,
        /// Key as given by the caller.
        key: String,
    },
    /// A value was rejected by the field's type or bounds.
    InvalidValue {
        /// Section name as given by the caller.
        section: String,
        /// Key as given by the caller.
        key: String,
        /// Human readable reason.
        reason: String,
    },
    /// Writing the option file failed.
    Save(String),
}

impl fmt::Display for MycnfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MycnfError::Io(e) => write!(f, "I/O error: {}", e),
            MycnfError::Schema(msg) => write!(f, "Schema error: {}", msg),
            MycnfError::Config(msg) => write!(f, "Configuration error: {}", msg),
            MycnfError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            MycnfError::UnknownField { section, key } => {
                write!(f, "Unknown field [{}] {}", section, key)
            }
            MycnfError::RequiredField { section, key } => {
                write!(f, "[{}] {} is required and cannot be disabled", section, key)
            }
            MycnfError::InvalidValue {
                section,
                key,
                reason,
            } => write!(f, "Invalid value for [{}] {}: {}", section, key, reason),
            MycnfError::Save(msg) => write!(f, "Failed to save configurations: {}", msg),
        }
    }
}

impl std::error::Error for MycnfError {}

impl From<std::io::Error> for MycnfError {
    fn from(e: std::io::Error) -> Self {
        MycnfError::Io(e)
    }
}

impl From<toml::de::Error> for MycnfError {
    fn from(e: toml::de::Error) -> Self {
        MycnfError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for MycnfError {
    fn from(e: serde_json::Error) -> Self {
        MycnfError::Serialization(e.to_string())
    }
}

impl From<tempfile::PersistError> for MycnfError {
    fn from(e: tempfile::PersistError) -> Self {
        MycnfError::Save(e.error.to_string())
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, MycnfError>;
