// Bot error taxonomy
// Every failure a handler can hit is one of these; user-facing wording lives in `user_message`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Actor lacks the configured start-session role
    #[error("missing required role")]
    Unauthorized,

    /// Input did not satisfy a wizard step; the flow does not advance
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The stored configuration document could not be parsed
    #[error("configuration document is corrupt: {0}")]
    CorruptConfig(#[source] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Vote cast on a session that is unknown or already closed
    #[error("vote session is closed")]
    StaleVoteSession,

    #[error("discord error: {0}")]
    Platform(#[from] poise::serenity_prelude::Error),
}

impl BotError {
    /// Private notice shown to the acting user
    pub fn user_message(&self) -> String {
        match self {
            BotError::Unauthorized => {
                "You do not have permission to do that. Ask an admin to check the role set in `/setup`.".to_string()
            }
            BotError::ValidationFailed(reason) => reason.clone(),
            BotError::StaleVoteSession => "This vote has ended.".to_string(),
            _ => "Something went wrong while handling that. Please try again later.".to_string(),
        }
    }
}
