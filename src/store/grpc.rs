//! gRPC surface of the store service
//!
//! One service instance wraps the single shared [`KvEngine`]; tonic serves
//! every accepted connection on its own task, and the engine's internal
//! lock is the sole synchronization point. Handlers never return a gRPC
//! error for engine-level conditions; key failure travels in-band as the
//! `"unavailable"` reply value, and `Status` is reserved for transport
//! problems.

use crate::proto::kv_service_server::{KvService, KvServiceServer};
use crate::proto::{GetRequest, PutRequest, TestSetRequest, ValReply};
use crate::store::KvEngine;
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// KvGrpcService exposes Get / Put / TestSet against one shared engine.
pub struct KvGrpcService {
    engine: Arc<KvEngine>,
}

impl KvGrpcService {
    pub fn new(engine: Arc<KvEngine>) -> Self {
        Self { engine }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> KvServiceServer<Self> {
        KvServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl KvService for KvGrpcService {
    async fn get(&self, req: Request<GetRequest>) -> Result<Response<ValReply>, Status> {
        let args = req.into_inner();
        let val = self.engine.get(&args.key);
        tracing::debug!(key = %args.key, val = %val, "get");
        Ok(Response::new(ValReply { val }))
    }

    async fn put(&self, req: Request<PutRequest>) -> Result<Response<ValReply>, Status> {
        let args = req.into_inner();
        let val = self.engine.put(&args.key, &args.val);
        tracing::debug!(key = %args.key, val = %args.val, result = %val, "put");
        Ok(Response::new(ValReply { val }))
    }

    async fn test_set(&self, req: Request<TestSetRequest>) -> Result<Response<ValReply>, Status> {
        let args = req.into_inner();
        let val = self.engine.test_set(&args.key, &args.test_val, &args.new_val);
        tracing::debug!(
            key = %args.key,
            test_val = %args.test_val,
            new_val = %args.new_val,
            result = %val,
            "test_set"
        );
        Ok(Response::new(ValReply { val }))
    }
}
