//! Juror statistics and rank.
//!
//! Stats are a read model over the ledger, never counters bumped ad hoc.
//! [`JurorProfile`] has two fold steps, one per verdict and one per verdict
//! whose case has resolved. A full recompute ([`StatsEngine::profile`])
//! and the incremental [`StatsTracker`] both go through them, so the two
//! strategies cannot disagree.

use crate::error::Result;
use crate::ledger::Recorded;
use crate::models::{validate_id, CaseStatus, Verdict, Vote};
use crate::storage::Storage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tribunal_consensus::{Rank, RankLadder};

/// Counters derived from one juror's verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurorProfile {
    pub cases_reviewed: u64,
    pub guilty_votes: u64,
    pub innocent_votes: u64,
    /// Verdicts that matched the eventual resolution
    pub correct_verdicts: u64,
    /// Verdicts on cases that have left pending
    pub total_resolved_votes: u64,
}

impl JurorProfile {
    /// Count a cast verdict.
    pub fn record_vote(&mut self, vote: Vote) {
        self.cases_reviewed += 1;
        match vote {
            Vote::Guilty => self.guilty_votes += 1,
            Vote::Innocent => self.innocent_votes += 1,
        }
    }

    /// Count the outcome of a verdict's case. No-op while pending.
    pub fn record_outcome(&mut self, vote: Vote, status: CaseStatus) {
        if let Some(correct) = status.agrees_with(vote) {
            self.total_resolved_votes += 1;
            if correct {
                self.correct_verdicts += 1;
            }
        }
    }

    /// Both steps for a verdict whose case is currently `status`.
    pub fn record(&mut self, vote: Vote, status: CaseStatus) {
        self.record_vote(vote);
        self.record_outcome(vote, status);
    }

    /// `correct / resolved`, or 0 with nothing resolved.
    pub fn accuracy(&self) -> f64 {
        if self.total_resolved_votes == 0 {
            0.0
        } else {
            self.correct_verdicts as f64 / self.total_resolved_votes as f64
        }
    }
}

/// Next rank and distance to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRank {
    pub rank: Rank,
    pub cases_remaining: u64,
}

/// Stats as returned to a juror.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurorStats {
    pub juror_id: String,
    pub cases_reviewed: u64,
    pub guilty_votes: u64,
    pub innocent_votes: u64,
    pub correct_verdicts: u64,
    pub total_resolved_votes: u64,
    pub accuracy: f64,
    pub rank: Rank,
    pub next_rank: Option<NextRank>,
    pub pending_cases_available: usize,
}

impl JurorStats {
    /// Assemble the view from a profile.
    pub fn from_profile(
        juror_id: &str,
        profile: &JurorProfile,
        ladder: &RankLadder,
        pending_cases_available: usize,
    ) -> Self {
        Self {
            juror_id: juror_id.to_string(),
            cases_reviewed: profile.cases_reviewed,
            guilty_votes: profile.guilty_votes,
            innocent_votes: profile.innocent_votes,
            correct_verdicts: profile.correct_verdicts,
            total_resolved_votes: profile.total_resolved_votes,
            accuracy: profile.accuracy(),
            rank: ladder.rank_for(profile.cases_reviewed),
            next_rank: ladder
                .next_rank(profile.cases_reviewed)
                .map(|(rank, cases_remaining)| NextRank {
                    rank,
                    cases_remaining,
                }),
            pending_cases_available,
        }
    }
}

/// Full-recompute stats over the ledger.
pub struct StatsEngine {
    storage: Arc<Storage>,
    ladder: RankLadder,
}

impl StatsEngine {
    pub fn new(storage: Arc<Storage>, ladder: RankLadder) -> Self {
        Self { storage, ladder }
    }

    pub fn ladder(&self) -> &RankLadder {
        &self.ladder
    }

    /// Fold every verdict by `juror_id`, joined to its case's status.
    pub fn profile(&self, juror_id: &str) -> Result<JurorProfile> {
        validate_id("juror", juror_id)?;
        let mut profile = JurorProfile::default();
        for verdict in self.storage.verdicts_by_juror(juror_id)? {
            let status = self.status_of(&verdict)?;
            profile.record(verdict.vote, status);
        }
        Ok(profile)
    }

    /// Stats view for `juror_id`.
    pub fn stats(&self, juror_id: &str, pending_cases_available: usize) -> Result<JurorStats> {
        let profile = self.profile(juror_id)?;
        Ok(JurorStats::from_profile(
            juror_id,
            &profile,
            &self.ladder,
            pending_cases_available,
        ))
    }

    fn status_of(&self, verdict: &Verdict) -> Result<CaseStatus> {
        match self.storage.get_case(&verdict.case_id)? {
            Some(case) => Ok(case.status),
            None => {
                tracing::warn!(case = %verdict.case_id, "verdict refers to missing case");
                Ok(CaseStatus::Pending)
            }
        }
    }
}

/// Incrementally maintained profiles, fed from ledger results.
///
/// Opt-in: the node does not run one, and juror queries always go through
/// [`StatsEngine`]'s full recompute. Callers that want a warm cache feed
/// [`StatsTracker::apply`] with each result of
/// [`VerdictLedger::record_verdict`](crate::ledger::VerdictLedger::record_verdict)
/// and call [`StatsTracker::reconcile`] periodically to replace drifted
/// profiles with a full recompute.
#[derive(Debug, Default)]
pub struct StatsTracker {
    profiles: HashMap<String, JurorProfile>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one accepted submission.
    ///
    /// Counts the verdict itself and, if it resolved the case, the outcome
    /// for every verdict on that case (including this one).
    pub fn apply(&mut self, recorded: &Recorded, storage: &Storage) -> Result<()> {
        let verdict = &recorded.verdict;
        self.profiles
            .entry(verdict.juror_id.clone())
            .or_default()
            .record_vote(verdict.vote);

        if let Some(event) = &recorded.resolution {
            for v in storage.verdicts_for_case(&event.case_id)? {
                self.profiles
                    .entry(v.juror_id)
                    .or_default()
                    .record_outcome(v.vote, event.status);
            }
        }
        Ok(())
    }

    /// Current profile for a juror.
    pub fn profile(&self, juror_id: &str) -> JurorProfile {
        self.profiles.get(juror_id).copied().unwrap_or_default()
    }

    /// Recompute every tracked juror; returns how many had drifted.
    pub fn reconcile(&mut self, engine: &StatsEngine) -> Result<usize> {
        let mut drifted = 0;
        for (juror_id, profile) in self.profiles.iter_mut() {
            let fresh = engine.profile(juror_id)?;
            if fresh != *profile {
                tracing::warn!(juror = %juror_id, "stats drift corrected");
                *profile = fresh;
                drifted += 1;
            }
        }
        Ok(drifted)
    }
}
