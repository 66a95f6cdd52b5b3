//! Data models for the court.
//!
//! # Core Types
//!
//! - [`Case`] - A reported piece of content and its review lifecycle
//! - [`Verdict`] - One juror's vote on one case
//!
//! # Supporting Types
//!
//! - [`CaseReport`] - Intake payload from report creation
//! - [`ContentSnapshot`] - Frozen copy of the reported content
//! - [`AiAnalysis`] - Opaque toxicity scoring
//! - [`CaseStatus`] - `pending → reviewed | dismissed`

mod case;
mod verdict;

pub use case::{AiAnalysis, Case, CaseReport, CaseStatus, ContentSnapshot, ReportReason, TargetType};
pub use tribunal_consensus::{Basis, Tally, Vote};
pub use verdict::Verdict;

#[cfg(test)]
pub(crate) use case::fixtures;

use crate::error::{Error, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in unix milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Reject identifiers that would break storage key framing.
pub(crate) fn validate_id(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::Validation(format!("{} id is empty", kind)));
    }
    if id.contains(':') {
        return Err(Error::Validation(format!("{} id {:?} contains ':'", kind, id)));
    }
    Ok(())
}
