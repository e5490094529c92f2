//! WebSocket fan-out against real local sockets

use std::sync::Arc;
use std::time::Duration;

use apwatch_core::extract::ExtractedRecords;
use apwatch_core::fanout::{PushServer, SubscriberRegistry};
use apwatch_core::snapshot::{ApRange, ApView, Snapshot, SsidView, aggregate_at};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::TEST_DEADLINE;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (Arc<SubscriberRegistry>, String, tokio::task::JoinHandle<()>) {
    let registry = Arc::new(SubscriberRegistry::new());
    let server = PushServer::bind("127.0.0.1:0", Arc::clone(&registry))
        .await
        .unwrap();
    let url = format!("ws://{}", server.local_addr().unwrap());
    let task = tokio::spawn(server.run());
    (registry, url, task)
}

async fn connect(url: &str) -> Client {
    let (client, _response) = connect_async(url).await.unwrap();
    client
}

/// Waits until the server has registered `count` subscribers
async fn wait_for_subscribers(registry: &SubscriberRegistry, count: usize) {
    tokio::time::timeout(TEST_DEADLINE, async {
        while registry.len() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count should settle");
}

async fn next_snapshot(client: &mut Client) -> Snapshot {
    let message = tokio::time::timeout(TEST_DEADLINE, client.next())
        .await
        .expect("snapshot should arrive")
        .expect("stream open")
        .unwrap();
    match message {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

fn sample_snapshot() -> Snapshot {
    let mut snapshot =
        aggregate_at(&ExtractedRecords::default(), &ApRange::new(1, 2), 1_700_000_000);
    snapshot.access_points[0] = ApView::new(
        "ap_01",
        "6",
        "12",
        vec![SsidView::new("corp", 3, 10), SsidView::new("guest", 1, 5)],
    );
    snapshot.dhcp_utilization = 37.5;
    snapshot
}

#[tokio::test]
async fn test_client_receives_broadcast_snapshot() {
    let (registry, url, server) = start_server().await;
    let mut client = connect(&url).await;
    wait_for_subscribers(&registry, 1).await;

    let snapshot = sample_snapshot();
    let summary = registry.broadcast(&snapshot);
    assert_eq!(summary.delivered, 1);

    let received = next_snapshot(&mut client).await;
    assert_eq!(received, snapshot);
    assert_eq!(received.access_points[0].level, 3);

    server.abort();
}

#[tokio::test]
async fn test_every_client_gets_each_snapshot() {
    let (registry, url, server) = start_server().await;
    let mut first = connect(&url).await;
    let mut second = connect(&url).await;
    wait_for_subscribers(&registry, 2).await;

    let snapshot = sample_snapshot();
    registry.broadcast(&snapshot);

    assert_eq!(next_snapshot(&mut first).await, snapshot);
    assert_eq!(next_snapshot(&mut second).await, snapshot);

    server.abort();
}

#[tokio::test]
async fn test_new_client_waits_for_next_broadcast() {
    let (registry, url, server) = start_server().await;
    let mut early = connect(&url).await;
    wait_for_subscribers(&registry, 1).await;

    let before = sample_snapshot();
    registry.broadcast(&before);
    assert_eq!(next_snapshot(&mut early).await, before);

    let mut late = connect(&url).await;
    wait_for_subscribers(&registry, 2).await;

    let mut after = sample_snapshot();
    after.captured_at_epoch_seconds += 60;
    registry.broadcast(&after);

    // No replay of the earlier snapshot
    assert_eq!(next_snapshot(&mut late).await, after);
    assert_eq!(next_snapshot(&mut early).await, after);

    server.abort();
}

#[tokio::test]
async fn test_closed_client_is_deregistered() {
    let (registry, url, server) = start_server().await;
    let mut leaving = connect(&url).await;
    let mut staying = connect(&url).await;
    wait_for_subscribers(&registry, 2).await;

    leaving.close(None).await.unwrap();
    drop(leaving);
    wait_for_subscribers(&registry, 1).await;

    let snapshot = sample_snapshot();
    let summary = registry.broadcast(&snapshot);
    assert_eq!(summary.delivered, 1);
    assert_eq!(next_snapshot(&mut staying).await, snapshot);

    staying.send(Message::Close(None)).await.unwrap();
    wait_for_subscribers(&registry, 0).await;

    server.abort();
}
