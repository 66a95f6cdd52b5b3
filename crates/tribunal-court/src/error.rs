//! Error types for the court.

use serde::Serialize;
use thiserror::Error;

/// Result type for court operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in court operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No case with this id
    #[error("case not found: {0}")]
    CaseNotFound(String),

    /// Case already left pending
    #[error("case already resolved: {0}")]
    CaseAlreadyResolved(String),

    /// Intake produced an id that is already stored
    #[error("case already exists: {0}")]
    CaseExists(String),

    /// Juror already voted on this case
    #[error("juror {juror_id} already voted on case {case_id}")]
    DuplicateVote { case_id: String, juror_id: String },

    /// Juror wrote the reported content
    #[error("juror {juror_id} may not review case {case_id}")]
    SelfReviewForbidden { case_id: String, juror_id: String },

    /// Malformed input
    #[error("invalid input: {0}")]
    Validation(String),

    /// Storage busy or timed out; retry with backoff
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Consensus policy rejected its parameters
    #[error("policy error: {0}")]
    Policy(#[from] tribunal_consensus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Missing case or juror
    NotFound,
    /// Someone got there first; skip and continue
    Conflict,
    /// Self-review attempt
    Forbidden,
    /// Malformed input
    Validation,
    /// Retry with backoff
    Unavailable,
    /// Not recoverable by the caller
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::CaseNotFound(_) => ErrorClass::NotFound,
            Error::CaseAlreadyResolved(_) | Error::CaseExists(_) | Error::DuplicateVote { .. } => {
                ErrorClass::Conflict
            }
            Error::SelfReviewForbidden { .. } => ErrorClass::Forbidden,
            Error::Validation(_) => ErrorClass::Validation,
            Error::Unavailable(_) => ErrorClass::Unavailable,
            Error::Storage(_)
            | Error::Serialization(_)
            | Error::Config(_)
            | Error::Policy(_)
            | Error::Io(_) => ErrorClass::Internal,
        }
    }

    /// Whether a juror session should move on to its next case.
    pub fn is_skippable(&self) -> bool {
        self.class() == ErrorClass::Conflict
    }
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        use rocksdb::ErrorKind;
        match e.kind() {
            ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain => {
                Error::Unavailable(e.to_string())
            }
            _ => Error::Storage(e.to_string()),
        }
    }
}

impl From<tribunal_consensus::UnknownVote> for Error {
    fn from(e: tribunal_consensus::UnknownVote) -> Self {
        Error::Validation(e.to_string())
    }
}
