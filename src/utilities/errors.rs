//! Error types for the agent core.
//!
//! Routine UI races (advancing with no journey, crashing while unstable,
//! selecting an unknown persona) are not errors: those operations return
//! `bool` and degrade to no-ops. `CoreError` covers the surfaces that can
//! genuinely fail.

use thiserror::Error;

/// Errors raised by the agent core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A custom persona draft failed validation.
    #[error("invalid persona: {reason}")]
    InvalidPersona { reason: String },

    /// A skill id that is not in the ledger.
    #[error("unknown skill: {skill_id}")]
    UnknownSkill { skill_id: String },

    /// A journey template id that is not in the catalog.
    #[error("unknown journey template: {template_id}")]
    UnknownJourney { template_id: String },

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying store failure.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
