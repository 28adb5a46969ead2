//! Store service binary

use clap::{Parser, Subcommand};
use coordkv::common::StoreConfig;
use coordkv::StoreServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coordkv-store")]
#[command(about = "coordkv shared key-value service with CAS and failure injection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the store service
    Serve {
        /// Listen address
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Probability in [0,1] of a key becoming permanently unavailable
        /// on any single operation
        #[arg(long)]
        fail_prob: Option<f64>,

        /// RNG seed for a deterministic unavailability pattern
        #[arg(long)]
        seed: Option<u64>,

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
        Commands::Serve {
            bind,
            fail_prob,
            seed,
            config,
        } => {
            let mut store_config = match config {
                Some(path) => StoreConfig::from_file(&path)?,
                None => StoreConfig::default(),
            };
            if let Some(bind) = bind {
                store_config.bind_addr = bind;
            }
            if let Some(fail_prob) = fail_prob {
                store_config.fail_prob = fail_prob;
            }
            if let Some(seed) = seed {
                store_config.seed = Some(seed);
            }
            store_config.validate()?;

            StoreServer::new(store_config).serve().await?;
        }
    }

    Ok(())
}
