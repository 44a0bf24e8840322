//! Task model: the wire-level request, the immutable domain task, and
//! the completion notification pushed back to the client.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::TaskId;

/// Kind of rendering work a task requests.
///
/// Closed set: each variant has exactly one script template in
/// [`crate::script`], so adding a kind is a compile-time concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Perspective render from a positioned camera.
    Rendering,
    /// 360-degree panorama from a point.
    Panorama,
}

impl TaskKind {
    /// Parse a client-supplied kind string.
    ///
    /// Unknown kinds are rejected here, before any script or network
    /// work happens for the task.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "rendering" => Ok(TaskKind::Rendering),
            "panorama" => Ok(TaskKind::Panorama),
            other => Err(CoreError::UnsupportedKind(other.to_string())),
        }
    }

    /// Wire name of the kind, as used in client messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Rendering => "rendering",
            TaskKind::Panorama => "panorama",
        }
    }
}

/// One client-submitted unit of rendering work.
///
/// Created on intake and never mutated; retained in the registry for
/// the task's lifetime so the completion notification can echo the
/// kind back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTask {
    /// Caller-assigned unique id.
    pub task_id: TaskId,
    /// What to render.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Camera position `[x, y, z]`.
    pub position: [f32; 3],
    /// Camera rotation quaternion `[x, y, z, w]`; required for
    /// perspective renders, unused for panoramas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    /// Field of view in degrees.
    pub fov: f32,
    /// Output resolution `[width, height]`.
    pub rendering_size: [u64; 2],
}

/// Raw task request as read off the client channel.
///
/// The kind arrives as a free string; [`TaskRequest::into_task`]
/// narrows it to [`TaskKind`] so unsupported kinds fail before the
/// pipeline does any work.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub task_id: TaskId,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: Option<[f32; 4]>,
    pub fov: f32,
    pub rendering_size: [u64; 2],
}

impl TaskRequest {
    /// Validate the request and convert it into an immutable task.
    pub fn into_task(self) -> Result<RenderTask, CoreError> {
        let kind = TaskKind::parse(&self.kind)?;
        Ok(RenderTask {
            task_id: self.task_id,
            kind,
            position: self.position,
            rotation: self.rotation,
            fov: self.fov,
            rendering_size: self.rendering_size,
        })
    }
}

/// Completion message pushed to the submitting client once a job
/// reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNotification {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Terminal status as reported by the compute service.
    pub status: String,
    /// Extracted artifact paths, relative to the task's public
    /// output directory. Empty on failure.
    pub urls: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
