//! Error types for `habit_tracker`.

/// Errors that can occur while tracking habits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),

    /// The configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request was malformed or missed a required field.
    #[error("{0}")]
    InvalidInput(String),

    /// No task exists with the given ID.
    #[error("task not found: {0}")]
    TaskNotFound(i64),
}

/// How a failure is reported at the crate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent a malformed request; nothing was written.
    InvalidInput,
    /// The request referenced a task that does not exist.
    NotFound,
    /// Persistence or another internal step failed.
    StoreFailure,
}

impl Error {
    /// Build an invalid-input error from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Classify this error for boundary reporting.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::TaskNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::StoreFailure,
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
