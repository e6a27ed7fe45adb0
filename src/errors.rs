/*!
 * Error types for the dualsub library.
 *
 * This module contains custom error types for the different parts of the
 * subtitle pipeline, using the thiserror crate for ergonomic error definitions.
 * Most of them are soft: the polling and translation loops recover from every
 * failure here and never propagate it past their own boundary.
 */

use thiserror::Error;

use crate::subtitle_processor::TranslationFailure;

/// Errors that can occur when working with LLM provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors reported by a translation channel round trip
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// The request could not be delivered or no answer came back
    #[error("Translation request could not be delivered: {0}")]
    Transport(String),

    /// The channel answered but the provider behind it failed
    #[error("Translation provider reported an error: {message}")]
    Provider {
        /// Error message from the provider
        message: String,
        /// Optional machine-readable error category
        error_type: Option<String>,
    },

    /// The channel answered with something that is not a translation reply
    #[error("Malformed translation reply: {0}")]
    MalformedReply(String),
}

impl ChannelError {
    /// Failure category shown to the user for this error
    pub fn failure_kind(&self) -> TranslationFailure {
        match self {
            Self::Transport(_) => TranslationFailure::RequestTransport,
            Self::Provider { .. } => TranslationFailure::ProviderError,
            Self::MalformedReply(_) => TranslationFailure::Generic,
        }
    }
}

impl From<ProviderError> for ChannelError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RequestFailed(msg) | ProviderError::ConnectionError(msg) => {
                Self::Transport(msg)
            }
            ProviderError::ParseError(msg) => Self::MalformedReply(msg),
            ProviderError::ApiError { status_code, message } => Self::Provider {
                message: format!("{} - {}", status_code, message),
                error_type: Some("API_ERROR".to_string()),
            },
            ProviderError::RateLimitExceeded(msg) => Self::Provider {
                message: msg,
                error_type: Some("RATE_LIMITED".to_string()),
            },
            ProviderError::AuthenticationError(msg) => Self::Provider {
                message: msg,
                error_type: Some("AUTHENTICATION".to_string()),
            },
        }
    }
}

/// Soft errors raised while parsing a subtitle track.
///
/// They never leave the parser: the offending block is skipped and logged.
#[derive(Error, Debug, PartialEq)]
pub enum SubtitleError {
    /// The input does not start with a WEBVTT header
    #[error("Missing WEBVTT header")]
    MissingHeader,

    /// A cue block has no usable timing line or text
    #[error("Malformed cue block: {0}")]
    MalformedBlock(String),

    /// A timestamp could not be turned into seconds
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a translation channel
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
