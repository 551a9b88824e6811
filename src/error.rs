//! Error types for dockhand

use thiserror::Error;

/// Main error type for dockhand
#[derive(Debug, Error)]
pub enum DockhandError {
    /// Referenced server or container does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mutating an environment-scope record from the control surface
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Remote host rejected the credential (password or key)
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Connection-level failure talking to a remote host
    #[error("Network error: {0}")]
    Network(String),

    /// Remote command did not finish in time; the remote-side process
    /// is not guaranteed to be cancelled
    #[error("Command timeout after {0}ms")]
    Timeout(u64),

    /// Routing token could not be decoded
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Malformed output line from a remote command
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SSH key generation or parsing error
    #[error("SSH key error: {0}")]
    SshKey(String),
}

/// Result type alias using DockhandError
pub type Result<T> = std::result::Result<T, DockhandError>;

impl DockhandError {
    /// Create a not-found error from a string
    pub fn not_found(msg: impl Into<String>) -> Self {
        DockhandError::NotFound(msg.into())
    }

    /// Create a forbidden error from a string
    pub fn forbidden(msg: impl Into<String>) -> Self {
        DockhandError::Forbidden(msg.into())
    }

    /// Create an authentication error from a string
    pub fn auth(msg: impl Into<String>) -> Self {
        DockhandError::AuthFailed(msg.into())
    }

    /// Create a network error from a string
    pub fn network(msg: impl Into<String>) -> Self {
        DockhandError::Network(msg.into())
    }

    /// Create an invalid-token error from a string
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        DockhandError::InvalidToken(msg.into())
    }

    /// Create a parse error from a string
    pub fn parse(msg: impl Into<String>) -> Self {
        DockhandError::Parse(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        DockhandError::Config(msg.into())
    }
}
