//! Script compiler: task parameters -> 3ds Max script text.
//!
//! Each [`TaskKind`] has exactly one template. The rendered script is
//! written under `{public_root}/scripts/` so the dispatch client can
//! hand the compute service a plain retrievable URL.

use std::fs;
use std::path::Path;

use crate::error::CoreError;
use crate::task::{RenderTask, TaskKind};
use crate::types::TaskId;

/// Directory under the public root where compiled scripts live.
const SCRIPTS_DIR: &str = "scripts";

/// Public-facing path of the script generated for a task.
///
/// Deterministic so the dispatch step can reference it as
/// `{PUBLIC_URL}{path}` without extra bookkeeping.
pub fn script_path(task_id: TaskId) -> String {
    format!("/{SCRIPTS_DIR}/job_{task_id}.ms")
}

/// Render the script text for a task.
///
/// Numeric fields use Rust's default float formatting, which is
/// locale-independent (`0` for `0.0`, `1.5` for `1.5`). A perspective
/// render without a rotation quaternion is rejected here; the template
/// needs all four components.
pub fn render_script(task: &RenderTask) -> Result<String, CoreError> {
    let [px, py, pz] = task.position;
    let [w, h] = task.rendering_size;

    match task.kind {
        TaskKind::Rendering => {
            let [rx, ry, rz, rw] = task.rotation.ok_or_else(|| {
                CoreError::Validation(format!(
                    "Task {} is a rendering task but carries no rotation",
                    task.task_id
                ))
            })?;
            Ok(format!(
                "renderAtView  [{px}, {py}, {pz}] [{rx}, {ry}, {rz}, {rw}] {fov} \"{id}\" {w} {h}",
                fov = task.fov,
                id = task.task_id,
            ))
        }
        TaskKind::Panorama => Ok(format!("renderPanoramaAtPoint  {px} {py} {pz} {w}")),
    }
}

/// Compile a task into a script file under the public root.
///
/// Creates `{public_root}/scripts/` if missing, overwrites any previous
/// script for the same task id, and returns the public-facing path.
/// `fs::write` opens, writes, and closes in one scoped operation, so no
/// handle outlives an error path.
pub fn compile(task: &RenderTask, public_root: &Path) -> Result<String, CoreError> {
    let content = render_script(task)?;

    let dir = public_root.join(SCRIPTS_DIR);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("job_{}.ms", task.task_id)), content)?;

    Ok(script_path(task.task_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
