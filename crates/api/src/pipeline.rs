//! Per-task intake pipeline: compile -> provision -> dispatch -> record.
//!
//! One pipeline runs per accepted task on its own spawned task, so a
//! slow external call only ever blocks that task. Every failure is
//! terminal for the task alone: log, leave no job correlation, move on.

use panomax_core::{script, RenderTask};

use crate::state::AppState;

/// Drive one task from `Received` to `Dispatched`.
///
/// The job id is recorded strictly last: a callback can only ever
/// resolve a task whose script and upload entries already exist.
pub async fn run_task_pipeline(state: AppState, task: RenderTask) {
    let task_id = task.task_id;

    // Script compilation touches the filesystem; keep it off the
    // async worker threads.
    let public_dir = state.config.public_dir.clone();
    let compile_task = task.clone();
    let script_path = match tokio::task::spawn_blocking(move || {
        script::compile(&compile_task, &public_dir)
    })
    .await
    {
        Ok(Ok(path)) => path,
        Ok(Err(e)) => {
            tracing::warn!(task_id, error = %e, "Could not create script");
            return;
        }
        Err(e) => {
            tracing::error!(task_id, error = %e, "Script compilation task panicked");
            return;
        }
    };
    tracing::info!(task_id, script = %script_path, "Created execution script");
    state.registry.record_script(task_id, script_path.clone()).await;

    let object_name = format!("output{task_id}.zip");
    let upload = match state
        .storage
        .create_signed_upload(&state.config.forge.bucket, &object_name)
        .await
    {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!(task_id, error = %e, "Could not create a signed url");
            return;
        }
    };
    tracing::info!(task_id, "Created signed upload url");
    state.registry.record_upload(task_id, upload.clone()).await;

    let script_url = format!("{}{}", state.config.public_url, script_path);
    let callback_url = format!("{}/report", state.config.public_url);
    let workitem = match state
        .dispatch
        .submit_workitem(
            &state.config.forge.activity_id,
            &state.config.forge.input_asset_url,
            &upload.signed_url,
            &script_url,
            &callback_url,
        )
        .await
    {
        Ok(workitem) => workitem,
        Err(e) => {
            tracing::warn!(task_id, error = %e, "Could not send the workitem");
            return;
        }
    };

    if let Err(e) = state.registry.record_job(workitem.id.clone(), task_id).await {
        tracing::error!(task_id, job_id = %workitem.id, error = %e, "Could not record job");
        return;
    }
    tracing::info!(job_id = %workitem.id, task_id, "Workitem created");
}
