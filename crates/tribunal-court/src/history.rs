//! Juror history: past verdicts joined with their cases, newest first.
//!
//! Entries render from the case's frozen content snapshot. The live
//! content is only probed for availability, and a failed probe marks that
//! one entry `unavailable` instead of failing the list.

use crate::error::Result;
use crate::models::{validate_id, CaseStatus, ContentSnapshot, ReportReason, TargetType, Vote};
use crate::storage::Storage;
use serde::Serialize;
use std::sync::Arc;

/// Whether the reported content still exists upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveContent {
    Available,
    Deleted,
    Unavailable,
}

/// Content storage collaborator.
pub trait ContentLookup: Send + Sync {
    /// `Ok(true)` if the target still exists, `Ok(false)` if deleted.
    fn exists(&self, target_type: TargetType, target_id: &str) -> Result<bool>;
}

/// Lookup used when no content store is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContentLookup;

impl ContentLookup for NoContentLookup {
    fn exists(&self, _target_type: TargetType, _target_id: &str) -> Result<bool> {
        Err(crate::error::Error::Unavailable("no content lookup configured".into()))
    }
}

/// Tally and correctness for a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOutcome {
    pub total: u32,
    pub guilty: u32,
    pub innocent: u32,
    /// `None` while the case is pending
    pub was_correct: Option<bool>,
}

/// One verdict in a juror's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub case_id: String,
    pub vote: Vote,
    pub voted_at: u64,
    pub reason: ReportReason,
    pub target_type: TargetType,
    pub status: CaseStatus,
    pub outcome: HistoryOutcome,
    pub snapshot: ContentSnapshot,
    pub live_content: LiveContent,
}

/// Builds history views.
pub struct HistoryBuilder {
    storage: Arc<Storage>,
    lookup: Arc<dyn ContentLookup>,
}

impl HistoryBuilder {
    pub fn new(storage: Arc<Storage>, lookup: Arc<dyn ContentLookup>) -> Self {
        Self { storage, lookup }
    }

    /// Every verdict by `juror_id`, newest first.
    pub fn history(&self, juror_id: &str) -> Result<Vec<HistoryEntry>> {
        validate_id("juror", juror_id)?;
        let mut entries = Vec::new();

        for verdict in self.storage.verdicts_by_juror(juror_id)? {
            let case = match self.storage.get_case(&verdict.case_id)? {
                Some(case) => case,
                None => {
                    tracing::warn!(case = %verdict.case_id, "history skipping verdict with missing case");
                    continue;
                }
            };

            let tally = case.visible_tally();
            let live_content = match self.lookup.exists(case.target_type, &case.target_id) {
                Ok(true) => LiveContent::Available,
                Ok(false) => LiveContent::Deleted,
                Err(e) => {
                    tracing::debug!(case = %case.id, "content lookup failed: {}", e);
                    LiveContent::Unavailable
                }
            };

            entries.push(HistoryEntry {
                case_id: verdict.case_id,
                vote: verdict.vote,
                voted_at: verdict.voted_at,
                reason: case.reason,
                target_type: case.target_type,
                status: case.status,
                outcome: HistoryOutcome {
                    total: tally.total(),
                    guilty: tally.guilty,
                    innocent: tally.innocent,
                    was_correct: case.status.agrees_with(verdict.vote),
                },
                snapshot: case.content_snapshot,
                live_content,
            });
        }

        entries.sort_by(|a, b| {
            b.voted_at
                .cmp(&a.voted_at)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        Ok(entries)
    }
}
