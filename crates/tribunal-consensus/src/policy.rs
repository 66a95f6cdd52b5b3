//! Verdict aggregation policy.
//!
//! After every accepted verdict the tally is evaluated against three knobs:
//!
//! - `min_votes`: no early resolution below this many votes
//! - `threshold`: a side wins early once it holds `ceil(total × threshold)` votes
//! - `max_votes`: hard cap; at the cap the strict majority wins and an exact
//!   tie is dismissed (the content gets the benefit of the doubt)
//!
//! Evaluation is a pure function of the tally, so every replica of the
//! ledger reaches the same decision for the same counts.

use crate::error::{Error, Result};
use crate::threshold::Threshold;
use std::fmt;
use std::str::FromStr;

/// One juror's binary verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Vote {
    /// The reported content breaks the rules.
    Guilty,
    /// The reported content is acceptable.
    Innocent,
}

impl Vote {
    /// Lowercase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Vote::Guilty => "guilty",
            Vote::Innocent => "innocent",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a vote string is neither `guilty` nor `innocent`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote {0:?} (expected guilty or innocent)")]
pub struct UnknownVote(pub String);

impl FromStr for Vote {
    type Err = UnknownVote;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guilty" => Ok(Vote::Guilty),
            "innocent" => Ok(Vote::Innocent),
            _ => Err(UnknownVote(s.to_string())),
        }
    }
}

/// Running vote counts for one case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tally {
    pub guilty: u32,
    pub innocent: u32,
}

impl Tally {
    /// Tally with explicit counts.
    pub const fn new(guilty: u32, innocent: u32) -> Self {
        Self { guilty, innocent }
    }

    /// Total votes cast.
    pub const fn total(&self) -> u32 {
        self.guilty + self.innocent
    }

    /// Votes cast for one side.
    pub const fn count(&self, vote: Vote) -> u32 {
        match vote {
            Vote::Guilty => self.guilty,
            Vote::Innocent => self.innocent,
        }
    }

    /// Add one vote.
    pub fn record(&mut self, vote: Vote) {
        match vote {
            Vote::Guilty => self.guilty += 1,
            Vote::Innocent => self.innocent += 1,
        }
    }

    /// Copy with one more vote.
    pub const fn with(self, vote: Vote) -> Self {
        match vote {
            Vote::Guilty => Self::new(self.guilty + 1, self.innocent),
            Vote::Innocent => Self::new(self.guilty, self.innocent + 1),
        }
    }
}

/// Why a case left the pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Basis {
    /// A side reached the supermajority threshold.
    Consensus,
    /// The vote cap was hit and one side held a strict majority.
    MajorityAtCap,
    /// The vote cap was hit with an exact tie.
    TieAtCap,
}

/// Outcome of evaluating a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep collecting votes.
    Open,
    /// Resolve the case in favour of `winner`.
    Resolved { winner: Vote, basis: Basis },
}

impl Decision {
    /// Whether the case should leave pending.
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Decision::Resolved { .. })
    }
}

/// Consensus policy knobs. All values are configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusPolicy {
    min_votes: u32,
    threshold: Threshold,
    max_votes: u32,
}

impl ConsensusPolicy {
    /// Build a policy. Requires `1 <= min_votes <= max_votes`.
    pub fn new(min_votes: u32, threshold: Threshold, max_votes: u32) -> Result<Self> {
        if min_votes == 0 || min_votes > max_votes {
            return Err(Error::InvalidVoteBounds {
                min: min_votes,
                max: max_votes,
            });
        }
        Ok(Self {
            min_votes,
            threshold,
            max_votes,
        })
    }

    /// Minimum votes before any early resolution.
    pub const fn min_votes(&self) -> u32 {
        self.min_votes
    }

    /// Supermajority fraction.
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Hard vote cap.
    pub const fn max_votes(&self) -> u32 {
        self.max_votes
    }

    /// Decide whether `tally` resolves the case.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_consensus::{Basis, ConsensusPolicy, Decision, Tally, Vote};
    ///
    /// let policy = ConsensusPolicy::default();
    /// assert_eq!(policy.evaluate(&Tally::new(2, 2)), Decision::Open);
    /// assert_eq!(
    ///     policy.evaluate(&Tally::new(3, 0)),
    ///     Decision::Resolved { winner: Vote::Guilty, basis: Basis::Consensus }
    /// );
    /// ```
    pub fn evaluate(&self, tally: &Tally) -> Decision {
        let total = tally.total();

        if total >= self.min_votes {
            // Threshold > 1/2 means at most one side can qualify.
            for side in [Vote::Guilty, Vote::Innocent] {
                if self.threshold.is_met(tally.count(side), total) {
                    return Decision::Resolved {
                        winner: side,
                        basis: Basis::Consensus,
                    };
                }
            }
        }

        if total >= self.max_votes {
            return match tally.guilty.cmp(&tally.innocent) {
                std::cmp::Ordering::Greater => Decision::Resolved {
                    winner: Vote::Guilty,
                    basis: Basis::MajorityAtCap,
                },
                std::cmp::Ordering::Less => Decision::Resolved {
                    winner: Vote::Innocent,
                    basis: Basis::MajorityAtCap,
                },
                std::cmp::Ordering::Equal => Decision::Resolved {
                    winner: Vote::Innocent,
                    basis: Basis::TieAtCap,
                },
            };
        }

        Decision::Open
    }
}

impl Default for ConsensusPolicy {
    /// `min_votes = 3`, `threshold = 3/5`, `max_votes = 7`.
    fn default() -> Self {
        Self {
            min_votes: 3,
            threshold: Threshold::THREE_FIFTHS,
            max_votes: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolved(winner: Vote, basis: Basis) -> Decision {
        Decision::Resolved { winner, basis }
    }

    #[test]
    fn unanimous_three_resolves_guilty() {
        let p = ConsensusPolicy::default();
        assert_eq!(p.evaluate(&Tally::new(1, 0)), Decision::Open);
        assert_eq!(p.evaluate(&Tally::new(2, 0)), Decision::Open);
        assert_eq!(
            p.evaluate(&Tally::new(3, 0)),
            resolved(Vote::Guilty, Basis::Consensus)
        );
    }

    #[test]
    fn even_split_stays_open() {
        let p = ConsensusPolicy::default();
        assert_eq!(p.evaluate(&Tally::new(2, 2)), Decision::Open);
        assert_eq!(p.evaluate(&Tally::new(3, 3)), Decision::Open);
    }

    #[test]
    fn innocent_consensus_dismisses() {
        let p = ConsensusPolicy::default();
        assert_eq!(
            p.evaluate(&Tally::new(0, 3)),
            resolved(Vote::Innocent, Basis::Consensus)
        );
        assert_eq!(
            p.evaluate(&Tally::new(1, 3)),
            resolved(Vote::Innocent, Basis::Consensus)
        );
    }

    #[test]
    fn majority_at_cap() {
        let p = ConsensusPolicy::default();
        assert_eq!(
            p.evaluate(&Tally::new(4, 3)),
            resolved(Vote::Guilty, Basis::MajorityAtCap)
        );
        assert_eq!(
            p.evaluate(&Tally::new(3, 4)),
            resolved(Vote::Innocent, Basis::MajorityAtCap)
        );
    }

    #[test]
    fn tie_at_cap_dismisses() {
        let p = ConsensusPolicy::new(3, Threshold::THREE_FIFTHS, 6).unwrap();
        assert_eq!(
            p.evaluate(&Tally::new(3, 3)),
            resolved(Vote::Innocent, Basis::TieAtCap)
        );
    }

    #[test]
    fn nothing_resolves_below_minimum() {
        let p = ConsensusPolicy::new(5, Threshold::THREE_FIFTHS, 9).unwrap();
        assert_eq!(p.evaluate(&Tally::new(4, 0)), Decision::Open);
        assert!(p.evaluate(&Tally::new(5, 0)).is_resolved());
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(ConsensusPolicy::new(0, Threshold::THREE_FIFTHS, 7).is_err());
        assert_eq!(
            ConsensusPolicy::new(8, Threshold::THREE_FIFTHS, 7),
            Err(Error::InvalidVoteBounds { min: 8, max: 7 })
        );
    }

    #[test]
    fn vote_parsing() {
        assert_eq!("guilty".parse::<Vote>().unwrap(), Vote::Guilty);
        assert_eq!(" Innocent ".parse::<Vote>().unwrap(), Vote::Innocent);
        let err = "maybe".parse::<Vote>().unwrap_err();
        assert_eq!(err, UnknownVote("maybe".into()));
        assert_eq!(
            err.to_string(),
            "unknown vote \"maybe\" (expected guilty or innocent)"
        );
        let _: &dyn std::error::Error = &err;
        assert_eq!(Vote::Guilty.to_string(), "guilty");
    }

    fn any_policy() -> impl Strategy<Value = ConsensusPolicy> {
        (1u32..6, 0u32..6, 51u32..=100).prop_map(|(min, extra, pct)| {
            let threshold = Threshold::new(pct, 100).unwrap();
            ConsensusPolicy::new(min, threshold, min + extra).unwrap()
        })
    }

    proptest! {
        #[test]
        fn cap_always_resolves(policy in any_policy(), guilty in 0u32..20) {
            let cap = policy.max_votes();
            let g = guilty.min(cap);
            let tally = Tally::new(g, cap - g);
            prop_assert!(policy.evaluate(&tally).is_resolved());
        }

        #[test]
        fn below_minimum_never_resolves(policy in any_policy(), guilty in 0u32..10) {
            let total = policy.min_votes() - 1;
            let g = guilty.min(total);
            let tally = Tally::new(g, total - g);
            prop_assert_eq!(policy.evaluate(&tally), Decision::Open);
        }

        #[test]
        fn winner_never_holds_fewer_votes(policy in any_policy(), g in 0u32..12, i in 0u32..12) {
            let tally = Tally::new(g, i);
            if let Decision::Resolved { winner, .. } = policy.evaluate(&tally) {
                let loser = match winner {
                    Vote::Guilty => Vote::Innocent,
                    Vote::Innocent => Vote::Guilty,
                };
                prop_assert!(tally.count(winner) >= tally.count(loser));
            }
        }
    }
}
