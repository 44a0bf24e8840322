//! Two-legged OAuth client for the Forge authentication service.
//!
//! Every outbound Forge call is made under a bearer token scoped to
//! the calling component's needs; storage provisioning and workitem
//! dispatch deliberately request different scopes.

use serde::{Deserialize, Serialize};

/// A bearer token issued by the authentication service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bearer {
    /// The token value to place in the `Authorization` header.
    pub access_token: String,
    /// Token type, always `Bearer` in practice.
    pub token_type: String,
    /// Lifetime of the token in seconds.
    pub expires_in: u64,
}

/// Errors from token acquisition.
///
/// Fatal to the operation that requested the token, never to the
/// process: callers log and abandon the task at hand.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The authentication service returned a non-2xx status.
    #[error("Authentication failed ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Client-credentials ("two-legged") authenticator.
///
/// Holds the app credentials and issues a fresh token per call; the
/// services consuming it treat tokens as single-operation capabilities
/// rather than caching them.
pub struct ForgeAuth {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl ForgeAuth {
    /// Create an authenticator reusing an existing [`reqwest::Client`]
    /// (shared connection pool across all Forge services).
    ///
    /// * `base_url` - e.g. `https://developer.api.autodesk.com`.
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            client,
            base_url,
            client_id,
            client_secret,
        }
    }

    /// Obtain a bearer token for the given space-separated scopes.
    pub async fn authenticate(&self, scopes: &str) -> Result<Bearer, AuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", scopes),
        ];

        let response = self
            .client
            .post(format!("{}/authentication/v1/authenticate", self.base_url))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AuthError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bearer = response.json::<Bearer>().await?;
        tracing::debug!(scopes, expires_in = bearer.expires_in, "Issued bearer token");
        Ok(bearer)
    }
}
