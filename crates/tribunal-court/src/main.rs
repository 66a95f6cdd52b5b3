//! Court Node binary
//!
//! Serves the peer moderation court over HTTP and a local admin socket.

use tribunal_court::{CourtConfig, CourtNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "court_node=info,tribunal_court=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Court Node");

    let config = CourtConfig::from_env()?;

    // Create and run node
    let node = CourtNode::new(config).await?;
    node.run().await?;

    Ok(())
}
