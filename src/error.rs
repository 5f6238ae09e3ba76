//! Error handling for the Stencil application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for Stencil operations.
///
/// Note that the definition parser never produces an error: malformed
/// definition lines degrade to empty or default fields so that old
/// binaries can read definition files written by newer ones.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// The install destination already exists and no overwrite was requested
    #[error("Output directory already exists: '{output_dir}'. Use --force to overwrite")]
    OutputDirectoryExists { output_dir: String },

    /// The template source is missing or not a directory
    #[error("Template directory does not exist or is not a directory: '{path}'")]
    InvalidTemplate { path: String },

    /// The template directory contains no definition file
    #[error("No definition file found at '{path}'")]
    DefinitionNotFound { path: String },

    /// Represents validation failures in user input or data
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A post-install command exited with a non-zero status
    #[error("Command '{command}' failed with {status}")]
    CommandError { command: String, status: String },

    /// Represents errors while reading a pre-supplied answers payload
    #[error("Answers error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
