//! Error types for the critical rules runtime.

use critical_rules_store::StoreError;
use thiserror::Error;

/// Runtime-level error type.
///
/// Update failures are not represented here: they are reported to the
/// caller as text (see [`crate::UpdateError`]). These variants are the ones
/// that either stop the process or become protocol errors.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The rules document or version record could not be loaded at startup.
    ///
    /// Fatal: the process exits with a diagnostic.
    #[error("Failed to load installed rules: {0}")]
    StartupLoad(#[from] StoreError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A resource URI that the server does not expose.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A tool name that the server does not expose.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not match the tool's schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
