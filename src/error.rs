use thiserror::Error;

/// Rejection reported by the host for a windowing/tabbing command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host error: {message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock poisoned")]
    LockPoisoned,
}

// For native messaging replies - converts AppError to String
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}
