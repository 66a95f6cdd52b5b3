//! court-admin CLI tool
//!
//! Inspects cases and jurors on a running court node.
//!
//! Usage:
//!   court-admin show-case <case_id>
//!   court-admin list-pending [limit]
//!   court-admin juror-stats <juror_id>
//!   court-admin ping

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Admin command sent over the socket.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum AdminCommand {
    ShowCase { case_id: String },
    ListPending { limit: Option<usize> },
    JurorStats { juror_id: String },
    Ping,
}

/// Response from admin command.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AdminResponse {
    Error { error: String },
    List { items: Vec<String> },
    Record { value: serde_json::Value },
    Pong,
}

fn print_usage() {
    eprintln!("court-admin - Inspect a running court node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  court-admin show-case <case_id>      Print a case as JSON");
    eprintln!("  court-admin list-pending [limit]     List pending case ids, oldest first");
    eprintln!("  court-admin juror-stats <juror_id>   Print a juror's stats as JSON");
    eprintln!("  court-admin ping                     Check if daemon is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURT_SOCKET  Path to admin socket (default: ./court-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("COURT_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./court-data/admin.sock"))
}

fn send_command(cmd: AdminCommand) -> Result<AdminResponse, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to court-node at {:?}: {}\n\
             Is the court-node running?",
            socket_path, e
        )
    })?;

    let cmd_json = serde_json::to_string(&cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

enum Invocation {
    Help,
    Send(AdminCommand),
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let verb = args.get(1).ok_or("missing command")?;
    let arg = |name: &str| {
        args.get(2)
            .cloned()
            .ok_or_else(|| format!("{} requires a {} argument", verb, name))
    };

    let cmd = match verb.as_str() {
        "show-case" => AdminCommand::ShowCase {
            case_id: arg("case_id")?,
        },
        "list-pending" => AdminCommand::ListPending {
            limit: args
                .get(2)
                .map(|s| s.parse::<usize>())
                .transpose()
                .map_err(|e| format!("invalid limit: {}", e))?,
        },
        "juror-stats" => AdminCommand::JurorStats {
            juror_id: arg("juror_id")?,
        },
        "ping" => AdminCommand::Ping,
        "-h" | "--help" | "help" => return Ok(Invocation::Help),
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Invocation::Send(cmd))
}

/// Print a response; errors reported by the node come back as `Err`.
fn render(response: AdminResponse) -> Result<(), String> {
    match response {
        AdminResponse::Error { error } => return Err(format!("Error: {}", error)),
        AdminResponse::List { items } if items.is_empty() => println!("(none)"),
        AdminResponse::List { items } => items.iter().for_each(|id| println!("{}", id)),
        AdminResponse::Record { value } => {
            let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
            println!("{}", text);
        }
        AdminResponse::Pong => println!("pong - court-node is running"),
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let result = match parse_args(&args) {
        Ok(Invocation::Help) => {
            print_usage();
            return;
        }
        Ok(Invocation::Send(cmd)) => send_command(cmd).and_then(render),
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
