//! Court Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process with shared RocksDB storage
//! - HTTP API for jurors and report intake
//! - Unix admin socket for local operator queries (court-admin CLI)
//! - Resolution dispatcher forwarding guilty outcomes to moderation

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::error::{Error, Result};
use crate::events::{self, LoggingExecutor, ModerationExecutor};
use crate::ledger::UnknownAuthorPolicy;
use crate::service::{CourtSettings, Tribunal};
use crate::storage::{Storage, DEFAULT_LOCK_TIMEOUT_MS};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tribunal_consensus::{ConsensusPolicy, RankLadder, Threshold};

/// Configuration for a court node.
#[derive(Debug, Clone)]
pub struct CourtConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Admin socket path (for court-admin CLI)
    pub admin_socket: PathBuf,

    /// Row-lock wait before a submission fails as unavailable
    pub lock_timeout_ms: i64,

    /// Consensus, rank and review policy
    pub settings: CourtSettings,
}

impl CourtConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("COURT_DATA_DIR").unwrap_or_else(|| "./court-data".to_string()),
        );

        let api_addr: SocketAddr = parse_var(&lookup, "COURT_API_ADDR", "0.0.0.0:8080".parse().ok())?;

        let admin_socket = lookup("COURT_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        let lock_timeout_ms: i64 = parse_var(&lookup, "COURT_LOCK_TIMEOUT_MS", Some(DEFAULT_LOCK_TIMEOUT_MS))?;
        // RocksDB reads a negative timeout as "wait forever".
        if lock_timeout_ms <= 0 {
            return Err(Error::Config(format!(
                "COURT_LOCK_TIMEOUT_MS must be positive, got {}",
                lock_timeout_ms
            )));
        }

        let defaults = ConsensusPolicy::default();
        let min_votes = parse_var(&lookup, "COURT_MIN_VOTES", Some(defaults.min_votes()))?;
        let max_votes = parse_var(&lookup, "COURT_MAX_VOTES", Some(defaults.max_votes()))?;
        let threshold = match lookup("COURT_THRESHOLD") {
            Some(text) => Threshold::parse(&text)?,
            None => defaults.threshold(),
        };
        let policy = ConsensusPolicy::new(min_votes, threshold, max_votes)?;

        let ladder = match lookup("COURT_RANK_STEPS") {
            Some(text) => RankLadder::parse(&text)?,
            None => RankLadder::default(),
        };

        let unknown_author = if parse_var(&lookup, "COURT_BLOCK_UNKNOWN_AUTHOR", Some(false))? {
            UnknownAuthorPolicy::Block
        } else {
            UnknownAuthorPolicy::Permit
        };

        Ok(Self {
            data_dir,
            api_addr,
            admin_socket,
            lock_timeout_ms,
            settings: CourtSettings {
                policy,
                ladder,
                unknown_author,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: Option<T>) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(text) => text
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, text, e))),
        None => default.ok_or_else(|| Error::Config(format!("{} has no default", key))),
    }
}

/// A court node instance.
pub struct CourtNode {
    tribunal: Arc<Tribunal>,
    config: CourtConfig,
    executor: Arc<dyn ModerationExecutor>,
    events_rx: tokio::sync::broadcast::Receiver<events::ResolutionEvent>,
}

impl CourtNode {
    /// Create a new court node.
    pub async fn new(config: CourtConfig) -> Result<Self> {
        // Ensure data directory exists
        std::fs::create_dir_all(&config.data_dir)?;

        let storage = Arc::new(Storage::open_with_lock_timeout(
            &config.data_dir,
            config.lock_timeout_ms,
        )?);

        let (events_tx, events_rx) = events::channel();
        let tribunal = Arc::new(Tribunal::new(storage, config.settings).with_events(events_tx));

        Ok(Self {
            tribunal,
            config,
            executor: Arc::new(LoggingExecutor),
            events_rx,
        })
    }

    /// Replace the moderation executor (defaults to logging only).
    pub fn with_executor(mut self, executor: Arc<dyn ModerationExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Get the shared court (for API handlers).
    pub fn tribunal(&self) -> Arc<Tribunal> {
        Arc::clone(&self.tribunal)
    }

    /// Run the node (starts dispatcher, admin socket and HTTP server).
    pub async fn run(self) -> Result<()> {
        let policy = self.config.settings.policy;
        tracing::info!("Court node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);
        tracing::info!(
            "  Policy: min {} / threshold {} / cap {}",
            policy.min_votes(),
            policy.threshold(),
            policy.max_votes()
        );

        events::spawn_dispatcher(self.events_rx, Arc::clone(&self.executor));

        let admin_socket = AdminSocket::new(self.tribunal(), &self.config.admin_socket);
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        // Build HTTP API
        let app = api::build_router(self.tribunal());

        // Start HTTP server
        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
