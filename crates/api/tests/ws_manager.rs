//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics, targeted
//! delivery, and graceful shutdown behaviour.

use axum::extract::ws::Message;
use panomax_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() increments the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_increments_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: remove() decrements the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_decrements_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: send_to() delivers to the targeted connection only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_delivers_to_target_only() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let sent = manager
        .send_to("conn-1", Message::Text("for conn-1".into()))
        .await;
    assert!(sent, "send_to a live connection should return true");

    let msg = rx1.recv().await.expect("rx1 should receive the message");
    assert!(matches!(&msg, Message::Text(t) if *t == "for conn-1"));

    // conn-2's channel must stay empty.
    assert!(
        rx2.try_recv().is_err(),
        "rx2 should not receive a message targeted at conn-1"
    );
}

// ---------------------------------------------------------------------------
// Test: send_to() an unknown connection returns false
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_unknown_connection_returns_false() {
    let manager = WsManager::new();

    let sent = manager
        .send_to("ghost", Message::Text("anyone home".into()))
        .await;
    assert!(!sent);
}

// ---------------------------------------------------------------------------
// Test: send_to() a dropped receiver returns false without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_closed_channel_returns_false() {
    let manager = WsManager::new();

    let rx = manager.add("conn-1".to_string()).await;
    drop(rx);

    let sent = manager
        .send_to("conn-1", Message::Text("too late".into()))
        .await;
    assert!(!sent, "Delivery to a closed channel must be reported false");
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    // Connection count should be zero after shutdown.
    assert_eq!(manager.connection_count().await, 0);

    // Both receivers should have received a Close message.
    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: ping_all() reaches every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.ping_all().await;

    let msg1 = rx1.recv().await.expect("rx1 should receive a ping");
    let msg2 = rx2.recv().await.expect("rx2 should receive a ping");
    assert!(matches!(msg1, Message::Ping(_)));
    assert!(matches!(msg2, Message::Ping(_)));
}

// ---------------------------------------------------------------------------
// Test: multiple add/remove cycles work correctly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn multiple_add_remove_cycles() {
    let manager = WsManager::new();

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 1);

    let _rx3 = manager.add("conn-3".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-2").await;
    manager.remove("conn-3").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let _rx_old = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    // Re-add with the same ID -- should replace, not duplicate.
    let mut rx_new = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager
        .send_to("conn-1", Message::Text("replaced".into()))
        .await;
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if *t == "replaced"));
}
