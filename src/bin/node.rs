//! Node agent binary

use clap::{Parser, Subcommand};
use coordkv::common::NodeConfig;
use coordkv::node::StoreClient;
use coordkv::NodeAgent;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coordkv-node")]
#[command(about = "coordkv node agent: slot claim, heartbeat, membership, leader election")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a node agent against a store service
    Run {
        /// Store service endpoint, e.g. http://127.0.0.1:6070
        #[arg(long)]
        store: Option<String>,

        /// Unique node identifier (no whitespace)
        #[arg(long)]
        id: Option<String>,

        /// Optional TOML config file (CLI flags take priority)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { store, id, config } => {
            let mut node_config = match config {
                Some(path) => NodeConfig::from_file(&path)?,
                None => NodeConfig::default(),
            };
            if let Some(store) = store {
                node_config.store_addr = store;
            }
            if let Some(id) = id {
                node_config.node_id = id;
            }
            node_config.validate()?;

            tracing::info!("Starting node agent");
            tracing::info!("  Node ID: {}", node_config.node_id);
            tracing::info!("  Store: {}", node_config.store_addr);

            let client = StoreClient::connect(&node_config.store_addr).await?;
            let mut agent = NodeAgent::new(client, node_config.node_id);

            // Any remote-call failure is fatal: no retry, no reconnect.
            if let Err(e) = agent.run().await {
                tracing::error!("fatal: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
