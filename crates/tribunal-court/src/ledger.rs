//! Verdict ledger: append-only, one verdict per (juror, case).
//!
//! A verdict is recorded in a single storage transaction:
//!
//! 1. Lock the case row (`get_for_update`) and require `pending`
//! 2. Refuse self-review
//! 3. Lock the verdict key and refuse a second vote
//! 4. Write the verdict and its per-juror index entry
//! 5. Fold the vote into the running tally and let the resolver settle
//! 6. Commit
//!
//! Two racing submissions from the same juror serialize on the row locks;
//! the loser sees the winner's committed verdict and gets `DuplicateVote`.

use crate::error::{Error, Result};
use crate::events::ResolutionEvent;
use crate::models::{now_millis, validate_id, Case, Verdict, Vote};
use crate::resolver::ConsensusResolver;
use crate::storage::{keys, Storage};
use std::sync::Arc;

/// What to do when a case snapshot has no author id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAuthorPolicy {
    /// Anyone may review.
    #[default]
    Permit,
    /// Nobody may review.
    Block,
}

impl UnknownAuthorPolicy {
    /// Whether `juror_id` may vote on `case` given its recorded author.
    pub fn permits(&self, case: &Case, juror_id: &str) -> bool {
        match case.content_snapshot.author_id.as_deref() {
            Some(author) => author != juror_id,
            None => *self == UnknownAuthorPolicy::Permit,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub verdict: Verdict,
    /// Case as committed, including the updated tally.
    pub case: Case,
    /// Present only for the verdict that resolved the case.
    pub resolution: Option<ResolutionEvent>,
}

/// Durable verdict store.
pub struct VerdictLedger {
    storage: Arc<Storage>,
    resolver: ConsensusResolver,
    unknown_author: UnknownAuthorPolicy,
}

impl VerdictLedger {
    pub fn new(storage: Arc<Storage>, resolver: ConsensusResolver, unknown_author: UnknownAuthorPolicy) -> Self {
        Self {
            storage,
            resolver,
            unknown_author,
        }
    }

    pub fn unknown_author_policy(&self) -> UnknownAuthorPolicy {
        self.unknown_author
    }

    /// Record a verdict and settle the case in the same transaction.
    pub fn record_verdict(&self, juror_id: &str, case_id: &str, vote: Vote) -> Result<Recorded> {
        validate_id("juror", juror_id)?;
        validate_id("case", case_id)?;

        let case_key = keys::case(case_id);
        let txn = self.storage.transaction();

        let mut case: Case = match txn.get_for_update(case_key.as_bytes(), true)? {
            Some(data) => serde_json::from_slice(&data)?,
            None => return Err(Error::CaseNotFound(case_id.to_string())),
        };
        if case.status.is_terminal() {
            return Err(Error::CaseAlreadyResolved(case_id.to_string()));
        }
        if !self.unknown_author.permits(&case, juror_id) {
            return Err(Error::SelfReviewForbidden {
                case_id: case_id.to_string(),
                juror_id: juror_id.to_string(),
            });
        }

        let verdict_key = keys::verdict(case_id, juror_id);
        if txn.get_for_update(verdict_key.as_bytes(), true)?.is_some() {
            return Err(Error::DuplicateVote {
                case_id: case_id.to_string(),
                juror_id: juror_id.to_string(),
            });
        }

        let now = now_millis();
        let verdict = Verdict::new(case_id, juror_id, vote, now);
        let encoded = serde_json::to_vec(&verdict)?;
        txn.put(verdict_key.as_bytes(), &encoded)?;
        txn.put(keys::juror_verdict(juror_id, case_id).as_bytes(), &encoded)?;

        case.tally.record(vote);
        let resolution = self.resolver.settle(&txn, &mut case, now)?;
        txn.put(case_key.as_bytes(), serde_json::to_vec(&case)?)?;
        txn.commit()?;

        tracing::debug!(
            case = case_id,
            juror = juror_id,
            %vote,
            guilty = case.tally.guilty,
            innocent = case.tally.innocent,
            "verdict recorded"
        );

        Ok(Recorded {
            verdict,
            case,
            resolution,
        })
    }
}
