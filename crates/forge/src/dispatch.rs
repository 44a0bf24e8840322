//! Client for the Design Automation workitem endpoint.
//!
//! A workitem bundles four URL arguments -- fetch script, fetch input
//! scene, store output, post completion callback -- and yields the
//! externally assigned job id, the only handle that reappears when the
//! service calls back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, ForgeAuth};

/// OAuth scope required for workitem dispatch.
pub const SCOPE_DISPATCH: &str = "viewables:read";

/// One verb-tagged URL argument of a workitem.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItemArg {
    /// HTTP verb the compute service applies to the URL
    /// (`get`, `put`, or `post`).
    pub verb: &'static str,
    pub url: String,
}

/// The ordered argument bindings of a workitem submission.
///
/// Field names follow the service's wire format exactly.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItemArguments {
    #[serde(rename = "Script")]
    pub script: WorkItemArg,
    #[serde(rename = "InputFile")]
    pub input_file: WorkItemArg,
    #[serde(rename = "OutputFile")]
    pub output_file: WorkItemArg,
    #[serde(rename = "onComplete")]
    pub on_complete: WorkItemArg,
}

/// Workitem submission request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemSubmission {
    pub activity_id: String,
    pub arguments: WorkItemArguments,
}

/// Response to a successful workitem submission.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    /// Externally assigned job id.
    pub id: String,
    /// Initial status, usually `pending`.
    pub status: String,
}

/// Errors from the dispatch layer.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("Dispatch request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The dispatch service returned a non-2xx status.
    #[error("Dispatch service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the workitem endpoint.
pub struct DispatchApi {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<ForgeAuth>,
}

impl DispatchApi {
    /// Create a dispatch client sharing the process-wide HTTP pool and
    /// authenticator.
    pub fn new(client: reqwest::Client, base_url: String, auth: Arc<ForgeAuth>) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    /// Submit a workitem and return the service's job handle.
    ///
    /// The four URLs are bound in order: script (`get`), input asset
    /// (`get`), output target (`put`), completion callback (`post`).
    pub async fn submit_workitem(
        &self,
        activity_id: &str,
        input_url: &str,
        output_url: &str,
        script_url: &str,
        callback_url: &str,
    ) -> Result<WorkItem, DispatchError> {
        let submission = WorkItemSubmission {
            activity_id: activity_id.to_string(),
            arguments: WorkItemArguments {
                script: WorkItemArg {
                    verb: "get",
                    url: script_url.to_string(),
                },
                input_file: WorkItemArg {
                    verb: "get",
                    url: input_url.to_string(),
                },
                output_file: WorkItemArg {
                    verb: "put",
                    url: output_url.to_string(),
                },
                on_complete: WorkItemArg {
                    verb: "post",
                    url: callback_url.to_string(),
                },
            },
        };

        let bearer = self.auth.authenticate(SCOPE_DISPATCH).await?;

        let response = self
            .client
            .post(format!("{}/da/us-east/v3/workitems", self.base_url))
            .bearer_auth(&bearer.access_token)
            .json(&submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DispatchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let workitem = response.json::<WorkItem>().await?;
        tracing::debug!(
            job_id = %workitem.id,
            status = %workitem.status,
            "Workitem accepted",
        );
        Ok(workitem)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
