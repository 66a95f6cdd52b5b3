//! Case queue: pending cases a juror may still review.
//!
//! Pull model, no reservations. The same case can sit in many jurors'
//! queues at once, and eligibility is re-evaluated from storage on every
//! call. A juror that loses the race to a resolving vote gets
//! `CaseAlreadyResolved` on submit and moves on.

use crate::error::Result;
use crate::ledger::UnknownAuthorPolicy;
use crate::models::{validate_id, Case};
use crate::storage::Storage;
use std::sync::Arc;

/// Stateless queue view over the pending index.
pub struct CaseQueue {
    storage: Arc<Storage>,
    unknown_author: UnknownAuthorPolicy,
}

impl CaseQueue {
    pub fn new(storage: Arc<Storage>, unknown_author: UnknownAuthorPolicy) -> Self {
        Self {
            storage,
            unknown_author,
        }
    }

    /// Up to `limit` eligible cases, oldest first.
    pub fn queue_for_juror(&self, juror_id: &str, limit: usize) -> Result<Vec<Case>> {
        validate_id("juror", juror_id)?;
        let mut queue = Vec::new();
        if limit == 0 {
            return Ok(queue);
        }

        for case_id in self.storage.pending_case_ids()? {
            if let Some(case) = self.eligible(&case_id, juror_id)? {
                queue.push(case);
                if queue.len() == limit {
                    break;
                }
            }
        }

        Ok(queue)
    }

    /// Number of cases the juror could review right now.
    pub fn available_for(&self, juror_id: &str) -> Result<usize> {
        validate_id("juror", juror_id)?;
        let mut count = 0;
        for case_id in self.storage.pending_case_ids()? {
            if self.eligible(&case_id, juror_id)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn eligible(&self, case_id: &str, juror_id: &str) -> Result<Option<Case>> {
        let case = match self.storage.get_case(case_id)? {
            Some(case) => case,
            None => {
                tracing::warn!(case = case_id, "pending index points at missing case");
                return Ok(None);
            }
        };
        // The index can trail a resolution committed after the scan began.
        if !case.is_pending()
            || !self.unknown_author.permits(&case, juror_id)
            || self.storage.has_verdict(case_id, juror_id)?
        {
            return Ok(None);
        }
        Ok(Some(case))
    }
}
