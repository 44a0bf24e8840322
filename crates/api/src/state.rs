use std::sync::Arc;

use panomax_core::TaskRegistry;
use panomax_forge::{DispatchApi, ForgeAuth, StorageApi};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; all inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Task correlation registry shared by intake and callbacks.
    pub registry: Arc<TaskRegistry>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Two-legged authenticator (also backs the `/gettoken` endpoint).
    pub auth: Arc<ForgeAuth>,
    /// Signed upload-link provisioner.
    pub storage: Arc<StorageApi>,
    /// Workitem dispatch client.
    pub dispatch: Arc<DispatchApi>,
    /// Plain HTTP client for downloading result archives.
    pub http: reqwest::Client,
}

impl AppState {
    /// Wire up the full state from configuration.
    ///
    /// One `reqwest::Client` is shared by every outbound call for
    /// connection pooling.
    pub fn from_config(config: ServerConfig) -> Self {
        let http = reqwest::Client::new();

        let auth = Arc::new(ForgeAuth::new(
            http.clone(),
            config.forge.base_url.clone(),
            config.forge.client_id.clone(),
            config.forge.client_secret.clone(),
        ));
        let storage = Arc::new(StorageApi::new(
            http.clone(),
            config.forge.base_url.clone(),
            Arc::clone(&auth),
        ));
        let dispatch = Arc::new(DispatchApi::new(
            http.clone(),
            config.forge.base_url.clone(),
            Arc::clone(&auth),
        ));

        Self {
            config: Arc::new(config),
            registry: Arc::new(TaskRegistry::new()),
            ws_manager: Arc::new(WsManager::new()),
            auth,
            storage,
            dispatch,
            http,
        }
    }
}
