//! Write-once upload target for a task's output artifact.

use serde::{Deserialize, Serialize};

/// Signed URL granting write access to one storage object, as returned
/// by the storage service's signed-resource endpoint.
///
/// Obtained once per task before dispatch; after [`expiration`] the URL
/// is dead and the task would need a fresh one (re-dispatch is not
/// modeled, so in practice an expired target means an abandoned task).
///
/// [`expiration`]: UploadTarget::expiration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    /// Capability-bearing URL; a PUT writes the object, a GET reads it
    /// back once the compute service has uploaded the result.
    pub signed_url: String,
    /// Expiry, in minutes, as reported by the storage service.
    pub expiration: u64,
    /// Whether the URL is invalidated after its first use.
    pub single_use: bool,
}
