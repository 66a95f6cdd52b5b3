//! Case model - a content report under peer review.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use tribunal_consensus::{Basis, Tally, Vote};

/// Kind of content a case targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TargetType::Post => "post",
            TargetType::Comment => "comment",
        }
    }
}

/// Why the reporter flagged the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    HateSpeech,
    Violence,
    Misinformation,
    Nsfw,
    SelfHarm,
    Other,
}

/// Lifecycle status. `Reviewed` and `Dismissed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Collecting verdicts.
    Pending,
    /// Guilty consensus: the content is removed.
    Reviewed,
    /// Innocent consensus or tie at the cap: the content stays.
    Dismissed,
}

impl CaseStatus {
    /// Terminal status for a winning side.
    pub const fn for_winner(winner: Vote) -> Self {
        match winner {
            Vote::Guilty => CaseStatus::Reviewed,
            Vote::Innocent => CaseStatus::Dismissed,
        }
    }

    /// Whether the case has left pending.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, CaseStatus::Pending)
    }

    /// Whether `vote` agrees with this status. `None` while pending.
    pub fn agrees_with(&self, vote: Vote) -> Option<bool> {
        match self {
            CaseStatus::Pending => None,
            CaseStatus::Reviewed => Some(vote == Vote::Guilty),
            CaseStatus::Dismissed => Some(vote == Vote::Innocent),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Reviewed => "reviewed",
            CaseStatus::Dismissed => "dismissed",
        }
    }
}

/// Frozen copy of the reported content, taken at report time.
///
/// The live content may be edited or deleted later; jurors and history
/// always see this copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    /// Author of the content. `None` when the account no longer resolves.
    pub author_id: Option<String>,

    /// Text as it read when reported
    pub text: String,

    /// When the content was posted (unix millis)
    pub posted_at: u64,

    /// Community the content was posted in
    pub community: Option<String>,
}

/// Precomputed toxicity analysis. Opaque to the engine, never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    /// 0–100. Larger inputs are clamped on the way in.
    #[serde(deserialize_with = "clamped_score")]
    pub toxicity_score: u8,

    #[serde(default)]
    pub flagged_keywords: BTreeSet<String>,

    pub confidence_label: String,
}

impl AiAnalysis {
    pub const MAX_SCORE: u8 = 100;

    /// Analysis with the score clamped to 0–100.
    pub fn new(toxicity_score: u32, flagged_keywords: BTreeSet<String>, confidence_label: String) -> Self {
        Self {
            toxicity_score: toxicity_score.min(u32::from(Self::MAX_SCORE)) as u8,
            flagged_keywords,
            confidence_label,
        }
    }

    /// Same analysis with the score pulled into 0–100.
    pub fn clamped(mut self) -> Self {
        self.toxicity_score = self.toxicity_score.min(Self::MAX_SCORE);
        self
    }
}

fn clamped_score<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u64::deserialize(deserializer)?;
    Ok(raw.min(u64::from(AiAnalysis::MAX_SCORE)) as u8)
}

/// Payload supplied by report intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub target_type: TargetType,
    pub target_id: String,
    pub reporter_id: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub content_snapshot: ContentSnapshot,
}

/// A reported piece of content awaiting or having completed review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Blake3 hash of target and reporter at intake
    pub id: String,

    pub target_type: TargetType,
    pub target_id: String,
    pub reporter_id: String,
    pub reason: ReportReason,
    pub description: Option<String>,

    /// Intake time (unix millis); queue order key
    pub created_at: u64,

    pub status: CaseStatus,

    /// Set once, when the case leaves pending
    pub resolved_at: Option<u64>,

    pub content_snapshot: ContentSnapshot,

    #[serde(default)]
    pub ai_analysis: AiAnalysis,

    /// Running tally, updated in the same transaction as each verdict
    #[serde(default)]
    pub tally: Tally,

    /// Tally frozen at the resolution instant
    pub final_tally: Option<Tally>,

    /// Which rule resolved the case
    pub basis: Option<Basis>,
}

impl Case {
    /// Create a pending case from an intake report.
    pub fn new(report: CaseReport, ai_analysis: AiAnalysis, created_at: u64) -> Self {
        let id = Self::generate_id(
            format!(
                "{}:{}:{}:{}",
                report.target_type.as_str(),
                report.target_id,
                report.reporter_id,
                created_at
            )
            .as_bytes(),
        );
        Self {
            id,
            target_type: report.target_type,
            target_id: report.target_id,
            reporter_id: report.reporter_id,
            reason: report.reason,
            description: report.description,
            created_at,
            status: CaseStatus::Pending,
            resolved_at: None,
            content_snapshot: report.content_snapshot,
            ai_analysis,
            tally: Tally::default(),
            final_tally: None,
            basis: None,
        }
    }

    /// Generate ID from content hash.
    pub fn generate_id(content: &[u8]) -> String {
        let hash = blake3::hash(content);
        hex::encode(hash.as_bytes())
    }

    pub fn is_pending(&self) -> bool {
        self.status == CaseStatus::Pending
    }

    /// Whether `juror_id` wrote the reported content.
    pub fn is_authored_by(&self, juror_id: &str) -> bool {
        self.content_snapshot.author_id.as_deref() == Some(juror_id)
    }

    /// Tally to show for this case: frozen once resolved, running before.
    pub fn visible_tally(&self) -> Tally {
        self.final_tally.unwrap_or(self.tally)
    }
}
