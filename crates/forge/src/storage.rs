//! Client for the Forge object storage service (signed upload links).

use std::sync::Arc;

use panomax_core::UploadTarget;

use crate::auth::{AuthError, ForgeAuth};

/// OAuth scopes required for signed-link provisioning.
///
/// Intentionally broader than dispatch: the storage service is a
/// distinct trust boundary and needs bucket visibility.
pub const SCOPE_STORAGE: &str = "data:read data:write bucket:read";

/// Errors from the storage service layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service returned a non-2xx status.
    #[error("Storage service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the object storage endpoints.
pub struct StorageApi {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<ForgeAuth>,
}

impl StorageApi {
    /// Create a storage client sharing the process-wide HTTP pool and
    /// authenticator.
    pub fn new(client: reqwest::Client, base_url: String, auth: Arc<ForgeAuth>) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    /// Provision a write-once signed URL for one storage object.
    ///
    /// Sends `POST /oss/v2/buckets/{bucket}/objects/{object}/signed`
    /// with `access=readwrite` so the same URL later serves as the
    /// download source for the finished artifact. No retry; the caller
    /// decides whether to abandon the task.
    pub async fn create_signed_upload(
        &self,
        bucket_key: &str,
        object_name: &str,
    ) -> Result<UploadTarget, StorageError> {
        let bearer = self.auth.authenticate(SCOPE_STORAGE).await?;

        let response = self
            .client
            .post(format!(
                "{}/oss/v2/buckets/{}/objects/{}/signed?access=readwrite",
                self.base_url, bucket_key, object_name
            ))
            .bearer_auth(&bearer.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let target = response.json::<UploadTarget>().await?;
        tracing::debug!(
            bucket_key,
            object_name,
            expiration = target.expiration,
            "Provisioned signed upload url",
        );
        Ok(target)
    }
}
