//! Error types for HSP streams

use thiserror::Error;

use crate::core::blast_hspstream::{MethodRole, Status};

/// Failures surfaced by stream construction and by callers converting a
/// dispatch [`Status`] into a `Result`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("stream constructor did not register the {0} method")]
    MissingMethod(MethodRole),

    #[error("stream constructor failed: {0}")]
    ConstructorFailed(String),

    #[error("{op} on HSP stream returned {status}")]
    Dispatch { op: &'static str, status: Status },
}

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
