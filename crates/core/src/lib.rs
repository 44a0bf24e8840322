//! Domain core for the panomax rendering relay.
//!
//! Pure logic only -- no HTTP clients or server plumbing live here:
//!
//! - [`task`] -- the task model and wire types.
//! - [`script`] -- kind-specific script compilation.
//! - [`registry`] -- the in-memory task correlation registry.
//! - [`archive`] -- path-traversal-safe result extraction.
//! - [`upload`] -- the signed upload target record.

pub mod archive;
pub mod error;
pub mod registry;
pub mod script;
pub mod task;
pub mod types;
pub mod upload;

pub use error::CoreError;
pub use registry::TaskRegistry;
pub use task::{RenderTask, TaskKind, TaskNotification, TaskRequest};
pub use upload::UploadTarget;
