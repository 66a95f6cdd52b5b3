//! Verdict model - one juror's vote on one case.

use serde::{Deserialize, Serialize};
use tribunal_consensus::Vote;

/// A single, immutable verdict. At most one exists per (case, juror).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Blake3 hash of `case_id:juror_id`, unique by construction
    pub id: String,

    pub case_id: String,

    pub juror_id: String,

    pub vote: Vote,

    /// Unix millis
    pub voted_at: u64,
}

impl Verdict {
    /// Create a verdict.
    pub fn new(case_id: &str, juror_id: &str, vote: Vote, voted_at: u64) -> Self {
        Self {
            id: Self::generate_id(case_id, juror_id),
            case_id: case_id.to_string(),
            juror_id: juror_id.to_string(),
            vote,
            voted_at,
        }
    }

    /// Deterministic ID for a (case, juror) pair.
    pub fn generate_id(case_id: &str, juror_id: &str) -> String {
        let hash = blake3::hash(format!("{}:{}", case_id, juror_id).as_bytes());
        hex::encode(hash.as_bytes())
    }
}
