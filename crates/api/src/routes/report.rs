//! Completion callback endpoint, invoked by the compute service.
//!
//! This is the return half of the task correlation core: the only
//! identifier the callback carries is the externally assigned job id,
//! which the registry maps back to the task and the submitting client.

use axum::extract::ws::Message;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use panomax_core::{RenderTask, TaskNotification};

use crate::retrieve;
use crate::state::AppState;

/// Result payload posted by the compute service.
///
/// A malformed body is rejected by the `Json` extractor with a 4xx;
/// it never reaches this handler.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemResult {
    /// Externally assigned job id.
    pub id: String,
    /// Terminal status, `success` or a failure marker.
    pub status: String,
    /// Link to the service's execution report, when provided.
    #[serde(rename = "reportUrl", default)]
    pub report_url: Option<String>,
}

/// POST /report -- resolve the job id, ack, and finish the task.
///
/// Always answers 200 once the body decodes: an unmatched job id is
/// the callback's problem, not ours, and a retrieval failure is
/// terminal for that task only. The success path acks before doing
/// any retrieval work: the handler sits under the global request
/// timeout, and a slow artifact download must never turn a delivered
/// callback into a 408. Retrieval, notification, and reclamation run
/// detached, like the intake pipelines.
pub async fn report(
    State(state): State<AppState>,
    Json(result): Json<WorkItemResult>,
) -> StatusCode {
    tracing::info!(
        job_id = %result.id,
        status = %result.status,
        report_url = result.report_url.as_deref().unwrap_or(""),
        "Received job results",
    );

    let Some(task) = state.registry.resolve_task(&result.id).await else {
        tracing::warn!(job_id = %result.id, "Unmatched callback: job id unknown or task expired");
        return StatusCode::OK;
    };

    if result.status != "success" {
        // The job failed remotely; tell the client rather than going silent.
        notify_client(&state, &task, &result.status, Vec::new()).await;
        state.registry.remove_task(task.task_id).await;
        return StatusCode::OK;
    }

    tokio::spawn(complete_task(state, task, result));
    StatusCode::OK
}

/// Finish a successfully reported task: retrieve the artifact, notify
/// the submitting client, reclaim the registry entries.
///
/// Runs on its own spawned task so the callback handler can ack
/// within the request timeout regardless of archive size.
async fn complete_task(state: AppState, task: RenderTask, result: WorkItemResult) {
    let task_id = task.task_id;

    let Some(upload) = state.registry.resolve_upload(task_id).await else {
        // Jobs are recorded only after their upload target, so this
        // indicates the entries were reclaimed mid-callback.
        tracing::error!(task_id, job_id = %result.id, "No upload target recorded for finished job");
        state.registry.remove_task(task_id).await;
        return;
    };

    let urls = match retrieve::fetch_and_extract(
        &state.http,
        &upload.signed_url,
        task_id,
        &state.config.public_dir,
    )
    .await
    {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!(task_id, error = %e, "Could not retrieve result archive");
            notify_client(&state, &task, "failed", Vec::new()).await;
            state.registry.remove_task(task_id).await;
            return;
        }
    };

    notify_client(&state, &task, &result.status, urls).await;
    state.registry.remove_task(task_id).await;
}

/// Push a completion message to the connection bound to the task.
///
/// A missing binding or closed connection drops the notification with
/// a log line; the client simply disconnected first.
async fn notify_client(state: &AppState, task: &RenderTask, status: &str, urls: Vec<String>) {
    let Some(conn_id) = state.registry.resolve_conn(task.task_id).await else {
        tracing::warn!(
            task_id = task.task_id,
            "No client bound to task, dropping notification",
        );
        return;
    };

    let note = TaskNotification {
        task_id: task.task_id,
        kind: task.kind,
        status: status.to_string(),
        urls,
    };

    let json = match serde_json::to_string(&note) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(task_id = task.task_id, error = %e, "Could not encode notification");
            return;
        }
    };

    if !state
        .ws_manager
        .send_to(&conn_id, Message::Text(json.into()))
        .await
    {
        tracing::warn!(
            task_id = task.task_id,
            conn_id = %conn_id,
            "Client connection closed, dropping notification",
        );
    }
}
