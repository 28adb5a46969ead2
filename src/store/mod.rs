//! Store service: shared key-value engine and its gRPC surface

pub mod engine;
pub mod grpc;
pub mod server;

pub use engine::KvEngine;
pub use grpc::KvGrpcService;
pub use server::StoreServer;
