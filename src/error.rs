use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation API error: {0}")]
    Generation(String),

    #[error("Wallet API error: {0}")]
    Wallet(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoryError {
    /// Stable taxonomy name used by the API error payload.
    pub fn kind(&self) -> &'static str {
        match self {
            StoryError::Database(_) => "database",
            StoryError::Io(_) => "io",
            StoryError::Validation(_) => "validation",
            StoryError::NotFound(_) => "not_found",
            StoryError::Conflict(_) => "conflict",
            StoryError::Generation(_) => "generation",
            StoryError::Wallet(_) => "wallet",
            StoryError::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;

impl serde::Serialize for StoryError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
