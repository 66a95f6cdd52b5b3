//! The court facade: the operations jurors and intake call.
//!
//! Every call reads and writes through shared storage only. Nothing here
//! holds per-juror or per-session state, so any number of `Tribunal`
//! handles (threads, processes) may serve the same store.

use crate::error::{Error, Result};
use crate::events::ResolutionEvent;
use crate::history::{ContentLookup, HistoryBuilder, HistoryEntry, NoContentLookup};
use crate::ledger::{UnknownAuthorPolicy, VerdictLedger};
use crate::models::{now_millis, AiAnalysis, Case, CaseReport, CaseStatus, Tally, Verdict, Vote};
use crate::queue::CaseQueue;
use crate::resolver::ConsensusResolver;
use crate::stats::{JurorStats, StatsEngine};
use crate::storage::Storage;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tribunal_consensus::{ConsensusPolicy, RankLadder};

/// Policy knobs for a court.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourtSettings {
    pub policy: ConsensusPolicy,
    pub ladder: RankLadder,
    pub unknown_author: UnknownAuthorPolicy,
}

/// Result of `submit_verdict`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub verdict: Verdict,
    /// `None` if the stats read failed after the verdict committed
    pub updated_stats: Option<JurorStats>,
    /// True only for the verdict that resolved the case
    pub resolved: bool,
    pub status: CaseStatus,
    pub tally: Tally,
}

/// Peer moderation engine over one store.
pub struct Tribunal {
    storage: Arc<Storage>,
    ledger: VerdictLedger,
    queue: CaseQueue,
    stats: StatsEngine,
    history: HistoryBuilder,
    events: Option<broadcast::Sender<ResolutionEvent>>,
}

impl Tribunal {
    /// Create a court over `storage`.
    pub fn new(storage: Arc<Storage>, settings: CourtSettings) -> Self {
        Self {
            ledger: VerdictLedger::new(
                Arc::clone(&storage),
                ConsensusResolver::new(settings.policy),
                settings.unknown_author,
            ),
            queue: CaseQueue::new(Arc::clone(&storage), settings.unknown_author),
            stats: StatsEngine::new(Arc::clone(&storage), settings.ladder),
            history: HistoryBuilder::new(Arc::clone(&storage), Arc::new(NoContentLookup)),
            storage,
            events: None,
        }
    }

    /// Publish resolutions on this channel.
    pub fn with_events(mut self, tx: broadcast::Sender<ResolutionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Probe live content through this lookup when building history.
    pub fn with_content_lookup(mut self, lookup: Arc<dyn ContentLookup>) -> Self {
        self.history = HistoryBuilder::new(Arc::clone(&self.storage), lookup);
        self
    }

    /// Shared storage handle.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Stats engine (for reconciliation passes).
    pub fn stats_engine(&self) -> &StatsEngine {
        &self.stats
    }

    // --- Intake ---

    /// Open a pending case from a report and its precomputed analysis.
    pub fn open_case(&self, report: CaseReport, ai_analysis: AiAnalysis) -> Result<Case> {
        if report.target_id.trim().is_empty() {
            return Err(Error::Validation("target id is empty".into()));
        }
        if report.reporter_id.trim().is_empty() {
            return Err(Error::Validation("reporter id is empty".into()));
        }
        let case = Case::new(report, ai_analysis.clamped(), now_millis());
        self.storage.insert_case(&case)?;
        tracing::info!(
            case = %case.id,
            target = %case.target_id,
            target_type = case.target_type.as_str(),
            reason = ?case.reason,
            "case opened"
        );
        Ok(case)
    }

    /// Look up a case.
    pub fn get_case(&self, case_id: &str) -> Result<Case> {
        self.storage
            .get_case(case_id)?
            .ok_or_else(|| Error::CaseNotFound(case_id.to_string()))
    }

    // --- Juror operations ---

    /// Stats for a juror, including how many cases they could take now.
    pub fn fetch_juror_stats(&self, juror_id: &str) -> Result<JurorStats> {
        let available = self.queue.available_for(juror_id)?;
        self.stats.stats(juror_id, available)
    }

    /// Up to `limit` cases the juror may review, oldest first.
    pub fn fetch_case_queue(&self, juror_id: &str, limit: usize) -> Result<Vec<Case>> {
        self.queue.queue_for_juror(juror_id, limit)
    }

    /// Cast a verdict.
    ///
    /// `CaseAlreadyResolved` and `DuplicateVote` mean someone got there
    /// first; the caller should skip to its next case. Once the ledger
    /// commits, the call succeeds even if refreshing stats fails.
    pub fn submit_verdict(&self, juror_id: &str, case_id: &str, vote: Vote) -> Result<SubmitOutcome> {
        let recorded = self.ledger.record_verdict(juror_id, case_id, vote)?;

        let resolved = match recorded.resolution {
            Some(event) => {
                self.publish(event);
                true
            }
            None => false,
        };

        let updated_stats = stats_after_commit(juror_id, self.fetch_juror_stats(juror_id));
        Ok(SubmitOutcome {
            verdict: recorded.verdict,
            updated_stats,
            resolved,
            status: recorded.case.status,
            tally: recorded.case.tally,
        })
    }

    /// Verdict history, newest first.
    pub fn fetch_juror_history(&self, juror_id: &str) -> Result<Vec<HistoryEntry>> {
        self.history.history(juror_id)
    }

    fn publish(&self, event: ResolutionEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine; the event is advisory.
            if tx.send(event).is_err() {
                tracing::debug!("no resolution subscribers");
            }
        }
    }
}

/// The verdict is already durable, so a failed stats read must not turn
/// into an error the client would retry.
fn stats_after_commit(juror_id: &str, stats: Result<JurorStats>) -> Option<JurorStats> {
    match stats {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(juror = juror_id, "stats refresh after verdict failed: {}", e);
            None
        }
    }
}
