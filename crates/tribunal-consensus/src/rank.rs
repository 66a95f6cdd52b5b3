//! Juror rank ladder.
//!
//! Rank is a step function of the number of cases a juror has reviewed and
//! nothing else. Accuracy is reported alongside but never gates promotion,
//! so a good-faith vote on a contested case costs nothing.

use crate::error::{Error, Result};
use std::fmt;

/// Rank tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Rank {
    Novice,
    Associate,
    Senior,
    Chief,
}

impl Rank {
    /// All tiers in ascending order.
    pub const ALL: [Rank; 4] = [Rank::Novice, Rank::Associate, Rank::Senior, Rank::Chief];

    /// Human-readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Rank::Novice => "Novice Juror",
            Rank::Associate => "Associate Juror",
            Rank::Senior => "Senior Juror",
            Rank::Chief => "Chief Justice",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Case-count lower bounds for Associate, Senior and Chief.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLadder {
    steps: [u64; 3],
}

impl RankLadder {
    /// Build a ladder. Steps must be positive and strictly increasing.
    pub fn new(steps: [u64; 3]) -> Result<Self> {
        if steps[0] == 0 || steps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidRankSteps(format!("{:?}", steps)));
        }
        Ok(Self { steps })
    }

    /// Parse a comma-separated list such as `"10,50,200"`.
    pub fn parse(text: &str) -> Result<Self> {
        let parsed: std::result::Result<Vec<u64>, _> =
            text.split(',').map(|s| s.trim().parse::<u64>()).collect();
        let steps: [u64; 3] = parsed
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| Error::InvalidRankSteps(text.to_string()))?;
        Self::new(steps)
    }

    /// Lower bounds, ascending.
    pub const fn steps(&self) -> [u64; 3] {
        self.steps
    }

    /// Rank earned after `cases_reviewed` verdicts.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_consensus::{Rank, RankLadder};
    ///
    /// let ladder = RankLadder::default();
    /// assert_eq!(ladder.rank_for(9), Rank::Novice);
    /// assert_eq!(ladder.rank_for(10), Rank::Associate);
    /// assert_eq!(ladder.rank_for(200), Rank::Chief);
    /// ```
    pub fn rank_for(&self, cases_reviewed: u64) -> Rank {
        let tier = self
            .steps
            .iter()
            .take_while(|&&step| cases_reviewed >= step)
            .count();
        Rank::ALL[tier]
    }

    /// Next rank and how many more cases it takes, or `None` at the top.
    pub fn next_rank(&self, cases_reviewed: u64) -> Option<(Rank, u64)> {
        self.steps
            .iter()
            .zip(Rank::ALL.iter().skip(1))
            .find(|(&step, _)| cases_reviewed < step)
            .map(|(&step, &rank)| (rank, step - cases_reviewed))
    }
}

impl Default for RankLadder {
    /// Novice 0–9, Associate 10–49, Senior 50–199, Chief 200+.
    fn default() -> Self {
        Self {
            steps: [10, 50, 200],
        }
    }
}
