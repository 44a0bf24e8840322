//! In-memory task correlation registry.
//!
//! [`TaskRegistry`] holds the four correlation tables that tie a
//! client task to its compiled script, its upload target, the compute
//! service's job id, and the WebSocket connection that submitted it.
//! All tables sit behind one `RwLock`, so every operation observes a
//! consistent snapshot and concurrent pipeline/callback units never
//! race on a bare map.
//!
//! Entries are reclaimed on terminal callbacks via
//! [`TaskRegistry::remove_task`] and swept by age via
//! [`TaskRegistry::evict_older_than`], so a job that never calls back
//! cannot grow the tables forever.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::task::RenderTask;
use crate::types::{TaskId, Timestamp};
use crate::upload::UploadTarget;

/// Associates a still-open client connection with a task it submitted.
#[derive(Debug, Clone)]
pub struct ClientBinding {
    /// WebSocket connection id (owned by the connection manager).
    pub conn_id: String,
    pub task_id: TaskId,
}

/// A registered task plus its creation time (for eviction).
#[derive(Debug, Clone)]
struct TaskRecord {
    task: RenderTask,
    created_at: Timestamp,
}

#[derive(Default)]
struct RegistryInner {
    /// task id -> immutable task record.
    tasks: HashMap<TaskId, TaskRecord>,
    /// task id -> public-facing script path.
    scripts: HashMap<TaskId, String>,
    /// task id -> signed upload target for the result archive.
    uploads: HashMap<TaskId, UploadTarget>,
    /// external job id -> task id; the only route back from a callback.
    jobs: HashMap<String, TaskId>,
    /// Ordered connection bindings; a connection may own many tasks.
    bindings: Vec<ClientBinding>,
}

/// Thread-safe correlation store shared by the intake pipelines and
/// the callback handler. Wrap in `Arc` and clone freely.
#[derive(Default)]
pub struct TaskRegistry {
    inner: RwLock<RegistryInner>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // -- writes --------------------------------------------------------------

    /// Record a task at intake. Overwrites any stale record with the
    /// same id (the client owns id uniqueness).
    pub async fn register(&self, task: RenderTask) {
        let record = TaskRecord {
            task,
            created_at: chrono::Utc::now(),
        };
        self.inner.write().await.tasks.insert(record.task.task_id, record);
    }

    /// Record the compiled script's public path for a task.
    pub async fn record_script(&self, task_id: TaskId, path: String) {
        self.inner.write().await.scripts.insert(task_id, path);
    }

    /// Record the provisioned upload target for a task.
    pub async fn record_upload(&self, task_id: TaskId, target: UploadTarget) {
        self.inner.write().await.uploads.insert(task_id, target);
    }

    /// Correlate an externally assigned job id with a task.
    ///
    /// Must be called only after the task, script, and upload entries
    /// exist -- the dispatch call that yields the job id happens after
    /// compilation and link provisioning, and this is the last write of
    /// the pipeline. A duplicate job id is rejected: two live tasks
    /// behind one callback id would make the callback unresolvable.
    pub async fn record_job(&self, job_id: String, task_id: TaskId) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        if inner.jobs.contains_key(&job_id) {
            return Err(CoreError::Conflict(format!(
                "Job id '{job_id}' is already correlated with a task"
            )));
        }
        inner.jobs.insert(job_id, task_id);
        Ok(())
    }

    /// Bind a task to the connection that submitted it.
    pub async fn add_binding(&self, conn_id: &str, task_id: TaskId) {
        self.inner.write().await.bindings.push(ClientBinding {
            conn_id: conn_id.to_string(),
            task_id,
        });
    }

    // -- lookups -------------------------------------------------------------

    /// Resolve a callback's job id back to the originating task.
    /// `None` means the callback is unmatched (expired or never ours).
    pub async fn resolve_task(&self, job_id: &str) -> Option<RenderTask> {
        let inner = self.inner.read().await;
        let task_id = inner.jobs.get(job_id)?;
        inner.tasks.get(task_id).map(|r| r.task.clone())
    }

    /// Look up a task directly by its id.
    pub async fn task(&self, task_id: TaskId) -> Option<RenderTask> {
        self.inner.read().await.tasks.get(&task_id).map(|r| r.task.clone())
    }

    /// Public path of the script compiled for a task.
    pub async fn resolve_script(&self, task_id: TaskId) -> Option<String> {
        self.inner.read().await.scripts.get(&task_id).cloned()
    }

    /// Upload target provisioned for a task's result archive.
    pub async fn resolve_upload(&self, task_id: TaskId) -> Option<UploadTarget> {
        self.inner.read().await.uploads.get(&task_id).cloned()
    }

    /// Connection id of the client that submitted a task, if that
    /// connection is still bound.
    pub async fn resolve_conn(&self, task_id: TaskId) -> Option<String> {
        self.inner
            .read()
            .await
            .bindings
            .iter()
            .find(|b| b.task_id == task_id)
            .map(|b| b.conn_id.clone())
    }

    // -- reclamation ---------------------------------------------------------

    /// Drop every entry correlated with a task (terminal callback).
    pub async fn remove_task(&self, task_id: TaskId) {
        let mut inner = self.inner.write().await;
        inner.tasks.remove(&task_id);
        inner.scripts.remove(&task_id);
        inner.uploads.remove(&task_id);
        inner.jobs.retain(|_, tid| *tid != task_id);
        inner.bindings.retain(|b| b.task_id != task_id);
    }

    /// Drop all bindings for a closed connection.
    ///
    /// The task entries themselves stay: an in-flight job may still
    /// complete, at which point the notification is dropped and logged.
    pub async fn remove_conn_bindings(&self, conn_id: &str) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.bindings.len();
        inner.bindings.retain(|b| b.conn_id != conn_id);
        before - inner.bindings.len()
    }

    /// Evict every task older than `horizon`, treating it as abandoned.
    ///
    /// Returns the number of tasks removed. Driven by the background
    /// sweep so jobs that never call back cannot leak registry memory.
    pub async fn evict_older_than(&self, horizon: Duration) -> usize {
        // A horizon too large to represent means nothing is stale.
        let Some(cutoff) = chrono::Duration::from_std(horizon)
            .ok()
            .and_then(|d| chrono::Utc::now().checked_sub_signed(d))
        else {
            return 0;
        };

        let mut inner = self.inner.write().await;
        let stale: Vec<TaskId> = inner
            .tasks
            .iter()
            .filter(|(_, r)| r.created_at < cutoff)
            .map(|(id, _)| *id)
            .collect();

        for task_id in &stale {
            inner.tasks.remove(task_id);
            inner.scripts.remove(task_id);
            inner.uploads.remove(task_id);
            inner.jobs.retain(|_, tid| tid != task_id);
            inner.bindings.retain(|b| b.task_id != *task_id);
        }
        stale.len()
    }

    // -- introspection -------------------------------------------------------

    /// Number of registered tasks.
    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    /// Number of live job correlations.
    pub async fn job_count(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    /// Number of live client bindings.
    pub async fn binding_count(&self) -> usize {
        self.inner.read().await.bindings.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::task::TaskKind;

    fn task(task_id: TaskId) -> RenderTask {
        RenderTask {
            task_id,
            kind: TaskKind::Rendering,
            position: [0.0, 0.0, 0.0],
            rotation: Some([0.0, 0.0, 0.0, 1.0]),
            fov: 60.0,
            rendering_size: [800, 600],
        }
    }

    fn upload() -> UploadTarget {
        UploadTarget {
            signed_url: "https://storage.example/signed/abc".to_string(),
            expiration: 60,
            single_use: false,
        }
    }

    // -- job correlation -----------------------------------------------------

    #[tokio::test]
    async fn resolve_task_returns_the_task_recorded_for_the_job() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;
        registry.register(task(8)).await;
        registry.record_job("job-abc".to_string(), 7).await.expect("fresh job id");
        registry.record_job("job-def".to_string(), 8).await.expect("fresh job id");

        let resolved = registry.resolve_task("job-abc").await.expect("matched");
        assert_eq!(resolved.task_id, 7);
        let resolved = registry.resolve_task("job-def").await.expect("matched");
        assert_eq!(resolved.task_id, 8);
    }

    #[tokio::test]
    async fn unknown_job_id_resolves_to_none() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;

        assert!(registry.resolve_task("job-nope").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_job_id_is_rejected() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;
        registry.register(task(8)).await;
        registry.record_job("job-abc".to_string(), 7).await.expect("fresh job id");

        let err = registry
            .record_job("job-abc".to_string(), 8)
            .await
            .expect_err("duplicate job id must be rejected");
        assert_matches!(err, CoreError::Conflict(_));

        // The original correlation is untouched.
        let resolved = registry.resolve_task("job-abc").await.expect("matched");
        assert_eq!(resolved.task_id, 7);
    }

    // -- per-task lookups ----------------------------------------------------

    #[tokio::test]
    async fn script_and_upload_round_trip() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;
        registry.record_script(7, "/scripts/job_7.ms".to_string()).await;
        registry.record_upload(7, upload()).await;

        assert_eq!(
            registry.resolve_script(7).await.as_deref(),
            Some("/scripts/job_7.ms")
        );
        assert_eq!(
            registry.resolve_upload(7).await.expect("recorded").signed_url,
            "https://storage.example/signed/abc"
        );
        assert!(registry.resolve_script(99).await.is_none());
        assert!(registry.resolve_upload(99).await.is_none());
    }

    // -- bindings ------------------------------------------------------------

    #[tokio::test]
    async fn binding_resolves_to_submitting_connection() {
        let registry = TaskRegistry::new();
        registry.add_binding("conn-a", 7).await;
        registry.add_binding("conn-b", 8).await;

        assert_eq!(registry.resolve_conn(7).await.as_deref(), Some("conn-a"));
        assert_eq!(registry.resolve_conn(8).await.as_deref(), Some("conn-b"));
        assert!(registry.resolve_conn(9).await.is_none());
    }

    #[tokio::test]
    async fn disconnect_removes_only_that_connections_bindings() {
        let registry = TaskRegistry::new();
        registry.add_binding("conn-a", 7).await;
        registry.add_binding("conn-a", 8).await;
        registry.add_binding("conn-b", 9).await;

        let removed = registry.remove_conn_bindings("conn-a").await;
        assert_eq!(removed, 2);
        assert!(registry.resolve_conn(7).await.is_none());
        assert_eq!(registry.resolve_conn(9).await.as_deref(), Some("conn-b"));
    }

    // -- reclamation ---------------------------------------------------------

    #[tokio::test]
    async fn remove_task_drops_every_correlation() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;
        registry.record_script(7, "/scripts/job_7.ms".to_string()).await;
        registry.record_upload(7, upload()).await;
        registry.record_job("job-abc".to_string(), 7).await.expect("fresh job id");
        registry.add_binding("conn-a", 7).await;

        registry.remove_task(7).await;

        assert!(registry.task(7).await.is_none());
        assert!(registry.resolve_script(7).await.is_none());
        assert!(registry.resolve_upload(7).await.is_none());
        assert!(registry.resolve_task("job-abc").await.is_none());
        assert!(registry.resolve_conn(7).await.is_none());
        assert_eq!(registry.job_count().await, 0);
    }

    #[tokio::test]
    async fn eviction_removes_only_stale_tasks() {
        let registry = TaskRegistry::new();
        registry.register(task(7)).await;
        registry.record_job("job-abc".to_string(), 7).await.expect("fresh job id");

        // Nothing is older than an hour yet.
        assert_eq!(registry.evict_older_than(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.task_count().await, 1);

        // With a zero horizon everything just registered is stale.
        let removed = registry.evict_older_than(Duration::ZERO).await;
        assert_eq!(removed, 1);
        assert_eq!(registry.task_count().await, 0);
        assert_eq!(registry.job_count().await, 0);
    }
}
