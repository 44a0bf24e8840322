use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use panomax_core::TaskRequest;
use serde_json::json;

use crate::pipeline;
use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by two tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and greets the client.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Treats every inbound Text frame as a task request.
///   4. Cleans up connection state and task bindings on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone()).await;

    let greeting = json!({ "status": "Connected to ws channel" }).to_string();
    state
        .ws_manager
        .send_to(&conn_id, Message::Text(greeting.into()))
        .await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_task_message(&state, &conn_id, text.as_str()).await;
            }
            Ok(_other) => {
                // Binary and Ping frames carry no task requests.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: drop the connection, its task bindings, and the sender.
    state.ws_manager.remove(&conn_id).await;
    let removed = state.registry.remove_conn_bindings(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, removed_bindings = removed, "WebSocket disconnected");
}

/// Parse one inbound frame as a task request and launch its pipeline.
///
/// The pipeline runs on its own spawned task so a slow Forge call can
/// never block this connection's intake loop. A malformed or
/// unsupported request is logged and dropped; the connection stays
/// open for further tasks either way.
pub async fn handle_task_message(state: &AppState, conn_id: &str, text: &str) {
    let request: TaskRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Could not parse task request");
            return;
        }
    };

    let task = match request.into_task() {
        Ok(task) => task,
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Rejected task request");
            return;
        }
    };

    tracing::info!(
        task_id = task.task_id,
        kind = task.kind.as_str(),
        conn_id = %conn_id,
        "Received a task",
    );

    state.registry.register(task.clone()).await;
    state.registry.add_binding(conn_id, task.task_id).await;

    // Fire and forget: the intake loop must not wait on the pipeline.
    tokio::spawn(pipeline::run_task_pipeline(state.clone(), task));
}
