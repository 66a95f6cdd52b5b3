//! Shared harness for court scenarios.
//!
//! Each [`Court`] owns a temporary RocksDB directory that lives as long as
//! the harness does.

use std::sync::Arc;
use tempfile::TempDir;
use tribunal_court::{
    AiAnalysis, Case, CaseReport, ContentSnapshot, CourtSettings, ReportReason, Storage,
    TargetType, Tribunal,
};

/// A court over a throwaway store.
pub struct Court {
    pub tribunal: Arc<Tribunal>,
    _dir: TempDir,
}

impl Court {
    pub fn new() -> Self {
        Self::with_settings(CourtSettings::default())
    }

    pub fn with_settings(settings: CourtSettings) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Arc::new(Storage::open(dir.path()).expect("open storage"));
        Self {
            tribunal: Arc::new(Tribunal::new(storage, settings)),
            _dir: dir,
        }
    }

    /// Open a post report authored by `author`.
    pub fn open(&self, target_id: &str, author: Option<&str>) -> Case {
        self.tribunal
            .open_case(report(target_id, author), AiAnalysis::default())
            .expect("open case")
    }
}

impl Default for Court {
    fn default() -> Self {
        Self::new()
    }
}

/// A spam report against a post.
pub fn report(target_id: &str, author: Option<&str>) -> CaseReport {
    CaseReport {
        target_type: TargetType::Post,
        target_id: target_id.to_string(),
        reporter_id: "reporter".to_string(),
        reason: ReportReason::Spam,
        description: Some("reported in test".to_string()),
        content_snapshot: ContentSnapshot {
            author_id: author.map(str::to_string),
            text: format!("body of {}", target_id),
            posted_at: 1,
            community: None,
        },
    }
}
