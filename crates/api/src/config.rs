use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields except the Forge credentials have development defaults.
/// Malformed values panic at startup, which is the desired fail-fast
/// behaviour.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Externally reachable base URL of this service, used to build
    /// the script and callback URLs handed to the compute service
    /// (default: `http://localhost:8080`).
    pub public_url: String,
    /// Root of the publicly served file tree: compiled scripts go to
    /// `{public_dir}/scripts`, extracted results to
    /// `{public_dir}/images` (default: `www`).
    pub public_dir: PathBuf,
    /// Allowed CORS origins, comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Interval between registry eviction sweeps (default: `300`).
    pub sweep_interval_secs: u64,
    /// Age after which a task with no terminal callback is treated as
    /// abandoned and evicted (default: `3600`).
    pub task_ttl_secs: u64,
    /// Forge service endpoints and credentials.
    pub forge: ForgeConfig,
}

/// Configuration of the external Forge services.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// App credentials; required, no default.
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of all Forge endpoints
    /// (default: `https://developer.api.autodesk.com`).
    pub base_url: String,
    /// Storage bucket the output archives are written to.
    pub bucket: String,
    /// Fully qualified Design Automation activity id.
    pub activity_id: String,
    /// URL of the input scene handed to every workitem.
    pub input_asset_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                               |
    /// |-----------------------|---------------------------------------|
    /// | `HOST`                | `0.0.0.0`                             |
    /// | `PORT`                | `8080`                                |
    /// | `PUBLIC_URL`          | `http://localhost:8080`               |
    /// | `PUBLIC_DIR`          | `www`                                 |
    /// | `CORS_ORIGINS`        | `http://localhost:8080`               |
    /// | `REQUEST_TIMEOUT_SECS`| `30`                                  |
    /// | `SWEEP_INTERVAL_SECS` | `300`                                 |
    /// | `TASK_TTL_SECS`       | `3600`                                |
    /// | `FORGE_CLIENT_ID`     | *(required)*                          |
    /// | `FORGE_CLIENT_SECRET` | *(required)*                          |
    /// | `FORGE_BASE_URL`      | `https://developer.api.autodesk.com`  |
    /// | `FORGE_BUCKET`        | `store_for_da_max`                    |
    /// | `FORGE_ACTIVITY_ID`   | `Denix.RenderAllCamerasWithScriptParam+test` |
    /// | `INPUT_ASSET_URL`     | the sample `.max` scene               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();

        let public_dir = PathBuf::from(std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "www".into()));

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid u64");

        let task_ttl_secs: u64 = std::env::var("TASK_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("TASK_TTL_SECS must be a valid u64");

        Self {
            host,
            port,
            public_url,
            public_dir,
            cors_origins,
            request_timeout_secs,
            sweep_interval_secs,
            task_ttl_secs,
            forge: ForgeConfig::from_env(),
        }
    }
}

impl ForgeConfig {
    fn from_env() -> Self {
        let client_id =
            std::env::var("FORGE_CLIENT_ID").expect("FORGE_CLIENT_ID must be set");
        let client_secret =
            std::env::var("FORGE_CLIENT_SECRET").expect("FORGE_CLIENT_SECRET must be set");

        let base_url = std::env::var("FORGE_BASE_URL")
            .unwrap_or_else(|_| "https://developer.api.autodesk.com".into())
            .trim_end_matches('/')
            .to_string();

        let bucket = std::env::var("FORGE_BUCKET").unwrap_or_else(|_| "store_for_da_max".into());

        let activity_id = std::env::var("FORGE_ACTIVITY_ID")
            .unwrap_or_else(|_| "Denix.RenderAllCamerasWithScriptParam+test".into());

        let input_asset_url = std::env::var("INPUT_ASSET_URL").unwrap_or_else(|_| {
            "https://sample-collection.s3.amazonaws.com/assets/models/radiosity.max".into()
        });

        Self {
            client_id,
            client_secret,
            base_url,
            bucket,
            activity_id,
            input_asset_url,
        }
    }
}
