//! Error types for the media housekeeper.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media housekeeper.
#[derive(Error, Debug)]
pub enum Error {
    // Startup errors
    #[error("Another instance is already running (lock held on {0})")]
    AlreadyRunning(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Refusing to move {src} into protected directory {dst}")]
    ProtectedPath { src: String, dst: String },

    // Classification errors
    #[error("No title could be derived for {0}")]
    NoTitle(String),

    // Metadata provider errors
    #[error("Metadata provider rate limited (HTTP {0})")]
    RateLimited(u16),

    #[error("Metadata provider error: {0}")]
    Provider(String),

    // Plan errors
    #[error("Invalid plan file: {0}")]
    InvalidPlanFile(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether a metadata lookup that failed with this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}
