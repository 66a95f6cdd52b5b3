//! Verdict Consensus Policy
//!
//! Pure decision rules for peer moderation. Jurors cast binary verdicts on a
//! reported case; this crate decides when the tally is conclusive and which
//! rank a juror holds. There is no I/O here: storage, atomic transitions and
//! request handling live in `tribunal-court`.
//!
//! # Early Resolution
//!
//! Once at least `min_votes` verdicts are in, a side wins as soon as it holds
//! `ceil(total × threshold)` of them. The threshold is an exact fraction above
//! one half, so two sides can never qualify together.
//!
//! # Vote Cap
//!
//! At `max_votes` the strict majority wins. A tie at the cap is dismissed.
//!
//! # Rank
//!
//! A monotonic step function of cases reviewed:
//! - Novice → 0
//! - Associate → 10
//! - Senior → 50
//! - Chief → 200

mod error;
mod policy;
mod rank;
mod threshold;

pub use error::{Error, Result};
pub use policy::{Basis, ConsensusPolicy, Decision, Tally, UnknownVote, Vote};
pub use rank::{Rank, RankLadder};
pub use threshold::Threshold;
