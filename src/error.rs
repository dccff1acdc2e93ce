//! Error types for the voterroll library.
//!
//! All errors are represented by the [`VoterRollError`] enum. The bootstrap
//! pipeline absorbs most of these into an empty ready state (see the
//! `controller` module); they still carry enough detail to be logged.
//!
//! # Examples
//!
//! ```
//! use voterroll::error::{Result, VoterRollError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VoterRollError::parse("dataset is not an array"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for voterroll operations.
#[derive(Error, Debug)]
pub enum VoterRollError {
    /// I/O errors (snapshot file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bulk dataset retrieval errors.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Response bodies that do not match the endpoint's declared schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snapshot store errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Batch partitioning errors.
    #[error("Partition error: {0}")]
    Partition(String),

    /// Invalid operation for the current controller state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// HTTP transport errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VoterRollError.
pub type Result<T> = std::result::Result<T, VoterRollError>;

impl VoterRollError {
    /// Create a new fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        VoterRollError::Fetch(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        VoterRollError::Parse(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        VoterRollError::Storage(msg.into())
    }

    /// Create a new partition error.
    pub fn partition<S: Into<String>>(msg: S) -> Self {
        VoterRollError::Partition(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        VoterRollError::InvalidOperation(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        VoterRollError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
