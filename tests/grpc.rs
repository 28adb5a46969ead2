//! End-to-end tests over a real gRPC connection
//!
//! Each test binds the full store service on an ephemeral loopback port
//! and talks to it through `StoreClient`, the same path the node binary
//! uses.

use coordkv::node::{KvApi, StoreClient};
use coordkv::store::{server, KvEngine};
use coordkv::NodeAgent;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn spawn_store(fail_prob: f64) -> (String, JoinHandle<coordkv::Result<()>>) {
    let engine = Arc::new(KvEngine::new(fail_prob).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server::serve_on(engine, listener));
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_get_put_roundtrip() {
    let (addr, server) = spawn_store(0.0).await;
    let mut client = StoreClient::connect(&addr).await.unwrap();

    assert_eq!(client.get("k").await.unwrap(), "");
    assert_eq!(client.put("k", "v").await.unwrap(), "");
    assert_eq!(client.get("k").await.unwrap(), "v");

    server.abort();
}

#[tokio::test]
async fn test_test_set_over_the_wire() {
    let (addr, server) = spawn_store(0.0).await;
    let mut client = StoreClient::connect(&addr).await.unwrap();

    assert_eq!(client.test_set("k", "", "a").await.unwrap(), "a");
    assert_eq!(client.test_set("k", "wrong", "b").await.unwrap(), "a");
    assert_eq!(client.test_set("k", "a", "b").await.unwrap(), "b");

    server.abort();
}

#[tokio::test]
async fn test_unavailable_travels_in_band() {
    // With fail-prob 1 the first operation on any fresh key fails; the
    // RPC itself still succeeds and the sentinel rides in the reply.
    let (addr, server) = spawn_store(1.0).await;
    let mut client = StoreClient::connect(&addr).await.unwrap();

    assert_eq!(client.get("a").await.unwrap(), "unavailable");
    assert_eq!(client.put("a", "v").await.unwrap(), "unavailable");
    assert_eq!(client.test_set("b", "", "v").await.unwrap(), "unavailable");

    server.abort();
}

#[tokio::test]
async fn test_concurrent_cas_has_one_winner() {
    let (addr, server) = spawn_store(0.0).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let addr = addr.clone();
        handles.push(tokio::spawn(async move {
            let id = format!("contender-{}", i);
            let mut client = StoreClient::connect(&addr).await.unwrap();
            let result = client.test_set("race", "", &id).await.unwrap();
            (id, result)
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let winners: Vec<&str> = results
        .iter()
        .filter(|(id, result)| id == result)
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(winners.len(), 1, "exactly one CAS must win: {:?}", results);

    // Every loser observed the winner's value.
    let winner = winners[0];
    for (id, result) in &results {
        if id != winner {
            assert_eq!(result, winner);
        }
    }

    server.abort();
}

#[tokio::test]
async fn test_two_agents_over_grpc() {
    let (addr, server) = spawn_store(0.0).await;

    let alpha_client = StoreClient::connect(&addr).await.unwrap();
    let beta_client = StoreClient::connect(&addr).await.unwrap();
    let mut alpha = NodeAgent::new(alpha_client, "alpha".to_string());
    let mut beta = NodeAgent::new(beta_client, "beta".to_string());

    assert_eq!(alpha.claim_slot().await.unwrap(), 0);
    assert_eq!(beta.claim_slot().await.unwrap(), 1);

    let view = alpha.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha0", "beta0"]);
    assert!(alpha.is_leader());

    let view = beta.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha1", "beta0"]);
    assert!(!beta.is_leader());

    server.abort();
}

#[tokio::test]
async fn test_connect_to_unreachable_store_fails() {
    // Nothing listens here; connection setup must surface a fatal error.
    let err = StoreClient::connect("http://127.0.0.1:1").await.err();
    assert!(err.is_some());
}
