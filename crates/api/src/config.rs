use std::time::Duration;

use crackers_core::catalog::{DEFAULT_ASSET_NAMESPACE, DEFAULT_UPLOAD_TIMEOUT};

use crate::catalog::CatalogSettings;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins from the comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `90`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight requests at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Asset store folder for catalog images (default: `crackers-admin`).
    pub asset_folder: String,
    /// Upper bound on a single image upload in seconds (default: `60`).
    pub upload_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["*".into()],
            request_timeout_secs: 90,
            shutdown_timeout_secs: 30,
            asset_folder: DEFAULT_ASSET_NAMESPACE.into(),
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default          |
    /// |-----------------------------|------------------|
    /// | `HOST`                      | `0.0.0.0`        |
    /// | `PORT`                      | `3000`           |
    /// | `CORS_ORIGINS`              | `*`              |
    /// | `REQUEST_TIMEOUT_SECS`      | `90`             |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`             |
    /// | `ASSET_FOLDER`              | `crackers-admin` |
    /// | `ASSET_UPLOAD_TIMEOUT_SECS` | `60`             |
    ///
    /// Panics on unparseable numbers; misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.cors_origins);

        let request_timeout_secs = secs_from_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs);
        let shutdown_timeout_secs =
            secs_from_env("SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout_secs);
        let upload_timeout_secs =
            secs_from_env("ASSET_UPLOAD_TIMEOUT_SECS", defaults.upload_timeout_secs);

        let asset_folder = std::env::var("ASSET_FOLDER")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.asset_folder);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            asset_folder,
            upload_timeout_secs,
        }
    }

    /// Settings handed to the catalog coordinator.
    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            namespace: self.asset_folder.clone(),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn secs_from_env(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid u64")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
