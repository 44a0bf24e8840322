//! HTTP clients for the external Forge services.
//!
//! Three thin [`reqwest`]-based clients, one per trust boundary:
//!
//! - [`auth`] -- two-legged OAuth token acquisition.
//! - [`storage`] -- signed upload-link provisioning.
//! - [`dispatch`] -- Design Automation workitem submission.
//!
//! All three share one `reqwest::Client` for connection pooling; each
//! exposes its own error enum so callers can tell which boundary
//! failed.

pub mod auth;
pub mod dispatch;
pub mod storage;

pub use auth::{AuthError, Bearer, ForgeAuth};
pub use dispatch::{DispatchApi, DispatchError, WorkItem};
pub use storage::{StorageApi, StorageError};
