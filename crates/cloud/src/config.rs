//! Cloudinary credentials.

/// Errors raised while loading Cloudinary credentials.
#[derive(Debug, thiserror::Error)]
pub enum CloudConfigError {
    #[error("Missing Cloudinary setting: {0}")]
    Missing(&'static str),

    #[error("Invalid CLOUDINARY_URL: {0}")]
    InvalidUrl(String),
}

/// Credentials for one Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl CloudinaryConfig {
    /// Load credentials from the environment.
    ///
    /// `CLOUDINARY_URL` (`cloudinary://<key>:<secret>@<cloud>`) takes
    /// precedence; otherwise `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`
    /// and `CLOUDINARY_API_SECRET` must all be set.
    pub fn from_env() -> Result<Self, CloudConfigError> {
        if let Ok(url) = std::env::var("CLOUDINARY_URL") {
            return Self::from_url(&url);
        }
        Ok(Self {
            cloud_name: require_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: require_env("CLOUDINARY_API_KEY")?,
            api_secret: require_env("CLOUDINARY_API_SECRET")?,
        })
    }

    /// Parse a `cloudinary://<key>:<secret>@<cloud>` URL.
    pub fn from_url(url: &str) -> Result<Self, CloudConfigError> {
        let rest = url
            .trim()
            .strip_prefix("cloudinary://")
            .ok_or_else(|| CloudConfigError::InvalidUrl("expected cloudinary:// scheme".into()))?;
        let (credentials, cloud_name) = rest
            .rsplit_once('@')
            .ok_or_else(|| CloudConfigError::InvalidUrl("missing '@<cloud_name>'".into()))?;
        let (api_key, api_secret) = credentials
            .split_once(':')
            .ok_or_else(|| CloudConfigError::InvalidUrl("missing '<key>:<secret>'".into()))?;

        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(CloudConfigError::InvalidUrl(
                "cloud name, key and secret must be non-empty".into(),
            ));
        }

        Ok(Self {
            cloud_name: cloud_name.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }
}

fn require_env(name: &'static str) -> Result<String, CloudConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CloudConfigError::Missing(name))
}
