//! Error types for Project Brawl.
//!
//! The simulation core never fails; these cover the data-loading surfaces
//! around it.

use thiserror::Error;

/// Top-level error type for Brawl operations.
#[derive(Debug, Error)]
pub enum BrawlError {
    /// Character roster errors
    #[error("Roster error: {0}")]
    Roster(String),

    /// Stage/map errors
    #[error("Stage error: {0}")]
    Stage(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A named character is not in the roster
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),
}

/// Result type alias for Brawl operations.
pub type BrawlResult<T> = Result<T, BrawlError>;
