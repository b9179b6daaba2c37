/*!
 * Error types for the autocut application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised when parsing timecode strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Subtitle timecode not in HH:MM:SS,mmm form
    #[error("Invalid subtitle timecode: {0}")]
    InvalidTimecode(String),

    /// Editing timecode not in HH:MM:SS:FF form
    #[error("Invalid editing timecode: {0}")]
    InvalidEditTimecode(String),
}

/// Errors that can occur when talking to the AI provider API
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
        message: String,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from timecode parsing
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Error from the AI provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from an external media tool invocation
    #[error("Media tool error: {0}")]
    MediaTool(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
