//! Store server

use crate::common::{Result, StoreConfig};
use crate::store::grpc::KvGrpcService;
use crate::store::KvEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

pub struct StoreServer {
    config: StoreConfig,
}

impl StoreServer {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        self.config.validate()?;

        tracing::info!("Starting store service");
        tracing::info!("  Listening on: {}", self.config.bind_addr);
        tracing::info!("  Key fail probability: {}", self.config.fail_prob);
        if let Some(seed) = self.config.seed {
            tracing::info!("  RNG seed: {}", seed);
        }

        let engine = match self.config.seed {
            Some(seed) => KvEngine::with_seed(self.config.fail_prob, seed)?,
            None => KvEngine::new(self.config.fail_prob)?,
        };

        // A bind failure is fatal; failures on individual connections only
        // drop that connection.
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("✓ Store service ready");
        serve_on(Arc::new(engine), listener).await
    }
}

/// Serve the gRPC surface on an already-bound listener. Split out so tests
/// can run the full service on an ephemeral port.
pub async fn serve_on(engine: Arc<KvEngine>, listener: TcpListener) -> Result<()> {
    let service = KvGrpcService::new(engine);
    tonic::transport::Server::builder()
        .add_service(service.into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    } else {
        tracing::info!("Shutting down store service");
    }
}
