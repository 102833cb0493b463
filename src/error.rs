//! Error types for Trialflux

use thiserror::Error;

/// Errors that can occur while recording, aggregating or persisting sessions
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Session is incomplete: {0}")]
    IncompleteSession(String),

    #[error("Trial {0} is prompted but has no prompt level")]
    MissingPromptLevel(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown trial: {0}")]
    UnknownTrial(u32),

    #[error("Unknown interval: {0}")]
    UnknownInterval(u32),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Duplicate invitation: {0}")]
    DuplicateInvitation(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Draft store error: {0}")]
    DraftStore(String),
}

impl CollectionError {
    /// Whether this error is an input-validation guard the user can fix by
    /// completing data entry, as opposed to a storage or parse failure.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            CollectionError::IncompleteSession(_)
                | CollectionError::MissingPromptLevel(_)
                | CollectionError::InvalidConfig(_)
                | CollectionError::InvalidEmail(_)
                | CollectionError::DuplicateInvitation(_)
        )
    }
}
