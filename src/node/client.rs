//! Client-side access to the store service
//!
//! [`KvApi`] is the seam between coordination logic and transport: the
//! node agent is generic over it. [`StoreClient`] is the production
//! implementation over a gRPC channel; `Arc<KvEngine>` implements it
//! directly so coordination logic can be exercised in-process.
//!
//! Key unavailability is a value, not an error: every method returns
//! `Ok` with whatever the store replied, and an `Err` strictly means a
//! transport problem, which is fatal to a node agent.

use crate::proto::kv_service_client::KvServiceClient;
use crate::proto::{GetRequest, PutRequest, TestSetRequest};
use crate::store::KvEngine;
use crate::{Error, Result};
use std::sync::Arc;
use tonic::transport::Channel;

/// The three-operation remote surface of the store.
#[tonic::async_trait]
pub trait KvApi: Send {
    async fn get(&mut self, key: &str) -> Result<String>;
    async fn put(&mut self, key: &str, val: &str) -> Result<String>;
    async fn test_set(&mut self, key: &str, test_val: &str, new_val: &str) -> Result<String>;
}

/// gRPC client for the store service.
pub struct StoreClient {
    inner: KvServiceClient<Channel>,
}

impl StoreClient {
    /// Connect to the store service, e.g. `http://127.0.0.1:6070`.
    pub async fn connect(addr: &str) -> Result<Self> {
        let inner = KvServiceClient::connect(addr.to_string())
            .await
            .map_err(|e| Error::ConnectionFailed(format!("{}: {}", addr, e)))?;
        Ok(Self { inner })
    }
}

#[tonic::async_trait]
impl KvApi for StoreClient {
    async fn get(&mut self, key: &str) -> Result<String> {
        let reply = self
            .inner
            .get(GetRequest {
                key: key.to_string(),
            })
            .await?;
        Ok(reply.into_inner().val)
    }

    async fn put(&mut self, key: &str, val: &str) -> Result<String> {
        let reply = self
            .inner
            .put(PutRequest {
                key: key.to_string(),
                val: val.to_string(),
            })
            .await?;
        Ok(reply.into_inner().val)
    }

    async fn test_set(&mut self, key: &str, test_val: &str, new_val: &str) -> Result<String> {
        let reply = self
            .inner
            .test_set(TestSetRequest {
                key: key.to_string(),
                test_val: test_val.to_string(),
                new_val: new_val.to_string(),
            })
            .await?;
        Ok(reply.into_inner().val)
    }
}

/// In-process implementation, bypassing the transport. The engine's own
/// lock still provides the linearizability the protocol relies on.
#[tonic::async_trait]
impl KvApi for Arc<KvEngine> {
    async fn get(&mut self, key: &str) -> Result<String> {
        Ok(KvEngine::get(self, key))
    }

    async fn put(&mut self, key: &str, val: &str) -> Result<String> {
        Ok(KvEngine::put(self, key, val))
    }

    async fn test_set(&mut self, key: &str, test_val: &str, new_val: &str) -> Result<String> {
        Ok(KvEngine::test_set(self, key, test_val, new_val))
    }
}
