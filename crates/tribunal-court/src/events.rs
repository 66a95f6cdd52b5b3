//! Resolution events and the moderation-action hand-off.
//!
//! The submission that wins a case's pending → terminal transition publishes
//! exactly one [`ResolutionEvent`] after its transaction commits. A
//! dispatcher task forwards `reviewed` outcomes to a [`ModerationExecutor`].
//! Execution is fire-and-forget: a failing executor is logged and the case
//! stays resolved.

use crate::error::Result;
use crate::models::{Basis, CaseStatus, ReportReason, Tally, TargetType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Capacity of the resolution broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Published once per case, by whichever verdict resolved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionEvent {
    pub case_id: String,
    pub status: CaseStatus,
    pub basis: Basis,
    pub tally: Tally,
    pub target_type: TargetType,
    pub target_id: String,
    pub reason: ReportReason,
    pub resolved_at: u64,
}

/// Request to act on content after a guilty resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationAction {
    pub case_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    pub reason: ReportReason,
}

impl ModerationAction {
    /// Action for an event, or `None` if the content stays up.
    pub fn for_event(event: &ResolutionEvent) -> Option<Self> {
        (event.status == CaseStatus::Reviewed).then(|| Self {
            case_id: event.case_id.clone(),
            target_type: event.target_type,
            target_id: event.target_id.clone(),
            reason: event.reason,
        })
    }
}

/// External system that hides or removes content.
pub trait ModerationExecutor: Send + Sync {
    /// Carry out the action. Retries are the executor's own business.
    fn execute(&self, action: &ModerationAction) -> Result<()>;
}

/// Executor that only logs. Used when no external system is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExecutor;

impl ModerationExecutor for LoggingExecutor {
    fn execute(&self, action: &ModerationAction) -> Result<()> {
        tracing::info!(
            case = %action.case_id,
            target = %action.target_id,
            target_type = action.target_type.as_str(),
            reason = ?action.reason,
            "moderation action requested"
        );
        Ok(())
    }
}

/// Create the resolution channel.
pub fn channel() -> (broadcast::Sender<ResolutionEvent>, broadcast::Receiver<ResolutionEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}

/// Forward events to `executor` until the channel closes.
pub async fn dispatch(
    mut rx: broadcast::Receiver<ResolutionEvent>,
    executor: Arc<dyn ModerationExecutor>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(action) = ModerationAction::for_event(&event) {
                    if let Err(e) = executor.execute(&action) {
                        tracing::warn!(case = %event.case_id, "moderation action failed: {}", e);
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("resolution dispatcher lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Spawn [`dispatch`] on the current runtime.
pub fn spawn_dispatcher(
    rx: broadcast::Receiver<ResolutionEvent>,
    executor: Arc<dyn ModerationExecutor>,
) -> JoinHandle<()> {
    tokio::spawn(dispatch(rx, executor))
}
