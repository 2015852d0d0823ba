//! Error types for CLI operations

use std::fmt;

use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Token or challenge could not be decoded
    #[error("{0}")]
    Parse(#[from] tokenwire::ParseError),

    /// Codec settings failed validation
    #[error("Invalid codec settings: {0}")]
    Codec(#[from] tokenwire::ConfigError),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML output error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CliError {
    /// Get user-friendly suggestions for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Parse(tokenwire::ParseError::Challenge { .. }) => vec![
                "Check the scheme keyword at the start of the header value",
                "Omit --scheme to accept any challenge scheme",
            ],
            Self::Parse(_) => vec![
                "Authorization values look like \"Bearer <token>\" or \"DPoP <token>\"",
                "Scheme keywords are case-sensitive",
            ],
            Self::Codec(_) | Self::Config(_) => vec![
                "Check the file passed with --config",
                "Check TOKENWIRE_CODEC__* environment variables",
            ],
            Self::InvalidArguments(_) => vec!["Use --help to see expected format"],
            Self::Json(_) => vec!["Token responses must be a JSON object"],
            _ => vec![],
        }
    }

    /// Get the error category for colored output
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(_) => ErrorCategory::Rejected,
            Self::InvalidArguments(_) => ErrorCategory::User,
            Self::Json(_) | Self::Yaml(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::System,
            Self::Codec(_) | Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// WWW-Authenticate value a server would answer this failure with
    pub fn challenge_header(&self) -> Option<String> {
        match self {
            Self::Parse(err) => err.challenge().map(tokenwire::ChallengeError::to_www_authenticate),
            _ => None,
        }
    }
}

/// Error categories for colored output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Rejected,
    User,
    Parsing,
    System,
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "Rejected"),
            Self::User => write!(f, "User Input"),
            Self::Parsing => write!(f, "Parsing"),
            Self::System => write!(f, "System"),
            Self::Config => write!(f, "Configuration"),
        }
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        Self::InvalidArguments(s.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
