//! Error types for the capability subsystem.

use thiserror::Error;

use crate::registration::ReasonCode;

/// Errors raised while interpreting a single feature tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The tag does not have the shape the caller expected.
    #[error("Malformed feature tag {tag:?}: {reason}")]
    Malformed { tag: String, reason: &'static str },
}

/// Errors from the registration gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The IMS engine has not been attached yet.
    #[error("Core is not instantiated")]
    CoreUnavailable,

    /// The engine exists but is not registered to the network.
    #[error("Core is not connected to IMS (reason: {reason})")]
    NotRegistered { reason: ReasonCode },
}

/// Errors from loading capability settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value parsed but is out of range.
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
