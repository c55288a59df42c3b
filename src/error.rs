use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// RepoMap error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Failed to acquire {repo}: {message}")]
    AcquisitionFailed { repo: String, message: String },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Summarizer error: {0}")]
    Summarize(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for RepoMap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AcquisitionFailed,
    Filesystem,
    NotFound,
    InvalidInput,
    Config,
    Summarization,
    Output,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::AcquisitionFailed => "acquisition_failed",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Config => "config",
            ErrorKind::Summarization => "summarization",
            ErrorKind::Output => "output",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Structured error result handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create an acquisition failure for a repository
    pub fn acquisition(repo: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AcquisitionFailed {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a summarizer error
    pub fn summarize(msg: impl Into<String>) -> Self {
        Error::Summarize(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::WalkDir(_) => ErrorKind::Filesystem,
            Error::ConfigParse(_) | Error::ConfigValidation(_) => ErrorKind::Config,
            Error::AcquisitionFailed { .. } => ErrorKind::AcquisitionFailed,
            Error::PathNotFound(_) | Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Template(_) | Error::Json(_) => ErrorKind::Output,
            Error::Summarize(_) => ErrorKind::Summarization,
            Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Flatten into a kind + message pair
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
