//! Unix socket server for admin commands.
//!
//! Provides a local IPC interface for operators to inspect cases and jurors.

use crate::error::Result;
use crate::service::Tribunal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Admin command sent over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Show one case
    ShowCase { case_id: String },
    /// List pending case ids, oldest first
    ListPending { limit: Option<usize> },
    /// Stats for a juror
    JurorStats { juror_id: String },
    /// Ping (health check)
    Ping,
}

/// Response from admin command.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Error { error: String },
    List { items: Vec<String> },
    Record { value: serde_json::Value },
    Pong,
}

/// Admin socket server.
pub struct AdminSocket {
    tribunal: Arc<Tribunal>,
    socket_path: PathBuf,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(tribunal: Arc<Tribunal>, socket_path: &Path) -> Self {
        Self {
            tribunal,
            socket_path: socket_path.to_path_buf(),
        }
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<()> {
        // Remove existing socket file if present
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let tribunal = Arc::clone(&self.tribunal);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tribunal).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, tribunal: Arc<Tribunal>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(cmd) => execute_command(cmd, &tribunal),
            Err(e) => AdminResponse::Error {
                error: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

fn record<T: Serialize>(result: Result<T>) -> AdminResponse {
    match result.and_then(|v| Ok(serde_json::to_value(v)?)) {
        Ok(value) => AdminResponse::Record { value },
        Err(e) => AdminResponse::Error {
            error: e.to_string(),
        },
    }
}

pub(crate) fn execute_command(cmd: AdminCommand, tribunal: &Tribunal) -> AdminResponse {
    match cmd {
        AdminCommand::ShowCase { case_id } => record(tribunal.get_case(&case_id)),

        AdminCommand::ListPending { limit } => match tribunal.storage().pending_case_ids() {
            Ok(mut ids) => {
                if let Some(limit) = limit {
                    ids.truncate(limit);
                }
                AdminResponse::List { items: ids }
            }
            Err(e) => AdminResponse::Error {
                error: e.to_string(),
            },
        },

        AdminCommand::JurorStats { juror_id } => record(tribunal.fetch_juror_stats(&juror_id)),

        AdminCommand::Ping => AdminResponse::Pong,
    }
}
