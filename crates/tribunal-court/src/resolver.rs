//! Consensus resolver: the one-way pending → terminal transition.
//!
//! Runs inside the verdict's transaction with the case row already locked,
//! so "set status = X where status = pending" is a single conditional
//! update. The first verdict that satisfies the policy flips the case; any
//! verdict arriving after sees a terminal status and is rejected with
//! `CaseAlreadyResolved`.

use crate::error::{Error, Result};
use crate::events::ResolutionEvent;
use crate::models::{Case, CaseStatus};
use crate::storage::{keys, Txn};
use tribunal_consensus::{ConsensusPolicy, Decision};

/// Applies a [`ConsensusPolicy`] to locked case rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusResolver {
    policy: ConsensusPolicy,
}

impl ConsensusResolver {
    pub fn new(policy: ConsensusPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ConsensusPolicy {
        &self.policy
    }

    /// Evaluate `case.tally` and, if conclusive, transition the case.
    ///
    /// On resolution the case's status, `resolved_at`, frozen tally and
    /// basis are set and its pending index entry is removed in `txn`. The
    /// caller writes the case row and commits.
    pub fn settle(&self, txn: &Txn<'_>, case: &mut Case, now: u64) -> Result<Option<ResolutionEvent>> {
        if !case.is_pending() {
            return Err(Error::CaseAlreadyResolved(case.id.clone()));
        }

        let (winner, basis) = match self.policy.evaluate(&case.tally) {
            Decision::Open => return Ok(None),
            Decision::Resolved { winner, basis } => (winner, basis),
        };

        let status = CaseStatus::for_winner(winner);
        case.status = status;
        case.resolved_at = Some(now);
        case.final_tally = Some(case.tally);
        case.basis = Some(basis);
        txn.delete(keys::pending(case.created_at, &case.id).as_bytes())?;

        tracing::info!(
            case = %case.id,
            status = status.as_str(),
            guilty = case.tally.guilty,
            innocent = case.tally.innocent,
            ?basis,
            "case resolved"
        );

        Ok(Some(ResolutionEvent {
            case_id: case.id.clone(),
            status,
            basis,
            tally: case.tally,
            target_type: case.target_type,
            target_id: case.target_id.clone(),
            reason: case.reason,
            resolved_at: now,
        }))
    }
}
