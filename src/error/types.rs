//! Error types
//!
//! Defines the error types for file operations and server startup.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A relative path resolved to a location outside the served root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfinementError;

impl fmt::Display for ConfinementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid path")
    }
}

impl std::error::Error for ConfinementError {}

/// File operation errors
#[derive(Debug)]
pub enum StorageError {
    /// Path escapes the served root. Never carries the offending input.
    InvalidPath,
    /// Rename target escapes the served root.
    InvalidNewName,
    MissingParameter(&'static str),
    MalformedRequest(String),
    NoFilesUploaded,
    NotText(String),
    TooLarge(u64),
    BodyRead(String),
    IoError(io::Error),
}

impl StorageError {
    /// True for failures detected before any filesystem access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StorageError::MissingParameter(_)
                | StorageError::MalformedRequest(_)
                | StorageError::NoFilesUploaded
        )
    }

    pub fn is_confinement(&self) -> bool {
        matches!(self, StorageError::InvalidPath | StorageError::InvalidNewName)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidPath => write!(f, "Invalid path"),
            StorageError::InvalidNewName => write!(f, "Invalid new name"),
            StorageError::MissingParameter(name) => write!(f, "Missing {} parameter", name),
            StorageError::MalformedRequest(msg) => write!(f, "{}", msg),
            StorageError::NoFilesUploaded => write!(f, "No files uploaded"),
            StorageError::NotText(p) => write!(f, "File is not valid UTF-8 text: {}", p),
            StorageError::TooLarge(limit) => {
                write!(f, "Request body exceeds the {} byte limit", limit)
            }
            StorageError::BodyRead(msg) => write!(f, "Failed to read request body: {}", msg),
            StorageError::IoError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl From<ConfinementError> for StorageError {
    fn from(_: ConfinementError) -> Self {
        StorageError::InvalidPath
    }
}

/// Fatal errors raised while starting the server
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    InvalidRoot(PathBuf, io::Error),
    Bind(String, io::Error),
    Serve(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::InvalidRoot(p, e) => {
                write!(f, "Cannot serve directory {}: {}", p.display(), e)
            }
            ServerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ServerError::Serve(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}
