/*!
 * Error types for the tplmin application.
 *
 * This module contains custom error types for the document pipeline and the
 * application layer, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while minifying a single document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MinifyError {
    /// The JavaScript minifier rejected its input
    #[error("JavaScript minification failed: {0}")]
    Js(String),

    /// The CSS minifier rejected its input
    #[error("CSS minification failed: {0}")]
    Css(String),

    /// No guard marker could be found that is absent from the document
    #[error("Guard marker collides with document content: {0}")]
    MarkerCollision(String),

    /// A guard marker was still present after decoding
    #[error("Guard marker leaked into minified output: {0}")]
    MarkerLeak(String),

    /// A caller supplied a marker outside the allowed alphabet
    #[error("Invalid guard marker: {0}")]
    InvalidMarker(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The input path given to a run does not exist
    #[error("Path does not exist: {0:?}")]
    PathNotFound(PathBuf),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the document pipeline
    #[error("Minify error: {0}")]
    Minify(#[from] MinifyError),

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
