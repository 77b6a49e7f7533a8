//! Error types shared by the codec, stores and quiz engine

use std::path::PathBuf;

use thiserror::Error;

/// The error type for every fallible operation in the core.
#[derive(Debug, Error)]
pub enum Error {
    /// A serialized record could not be read or written.
    #[error("Malformed {record}: {reason}")]
    Format { record: &'static str, reason: String },

    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    /// No dictionary pairs the user's main language with the given language.
    #[error("No dictionary between {main} and {language}")]
    Link { main: String, language: String },

    #[error("Language {0} has no dictionary and cannot be used right now")]
    TrackUnavailable(String),

    /// A registration or learning rule was not met. Carries a user-facing message.
    #[error("{0}")]
    Validation(String),

    #[error("Wrong username or password")]
    InvalidCredentials,

    /// Every word of the dictionary has already been unlocked.
    #[error("All {available} words of {language} are already unlocked ({unlocked} unlocked)")]
    OutOfRange {
        language: String,
        unlocked: usize,
        available: usize,
    },

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl Error {
    pub(crate) fn format(record: &'static str, reason: impl Into<String>) -> Self {
        Error::Format {
            record,
            reason: reason.into(),
        }
    }
}

/// Result alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
