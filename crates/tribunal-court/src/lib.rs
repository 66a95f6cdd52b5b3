//! Tribunal Court - Peer Moderation Engine
//!
//! Reported content becomes a case. Jurors vote guilty or innocent, and a
//! case resolves once enough of them agree. Every juror carries a running
//! accuracy record and a rank earned by volume of review.
//!
//! # Architecture
//!
//! - **Models**: Case, Verdict and intake types
//! - **Storage**: RocksDB transactional store shared by all handles
//! - **Ledger**: Atomic verdict recording with in-transaction resolution
//! - **Queue / Stats / History**: Read models for jurors
//! - **API**: HTTP endpoints for jurors and report intake
//! - **Admin Socket**: Unix socket for local admin commands (court-admin CLI)
//!
//! # Example
//!
//! ```no_run
//! use tribunal_court::{CourtConfig, CourtNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CourtConfig::from_env()?;
//!     let node = CourtNode::new(config).await?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod error;
pub mod events;
pub mod history;
pub mod ledger;
pub mod models;
pub mod node;
pub mod queue;
pub mod resolver;
pub mod service;
pub mod stats;
pub mod storage;

pub use error::{Error, ErrorClass, Result};
pub use events::{LoggingExecutor, ModerationAction, ModerationExecutor, ResolutionEvent};
pub use history::{ContentLookup, HistoryEntry, HistoryOutcome, LiveContent, NoContentLookup};
pub use ledger::{Recorded, UnknownAuthorPolicy, VerdictLedger};
pub use models::{
    AiAnalysis, Basis, Case, CaseReport, CaseStatus, ContentSnapshot, ReportReason, Tally,
    TargetType, Verdict, Vote,
};
pub use node::{CourtConfig, CourtNode};
pub use resolver::ConsensusResolver;
pub use service::{CourtSettings, SubmitOutcome, Tribunal};
pub use stats::{JurorProfile, JurorStats, NextRank, StatsEngine, StatsTracker};
pub use storage::Storage;
