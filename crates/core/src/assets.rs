//! Remote asset store boundary.
//!
//! Catalog images live in an external hosting service addressed by an opaque
//! per-asset identifier. [`AssetStore`] is the seam the catalog coordinator
//! talks to; the production implementation lives in `crackers-cloud`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::ImageUpload;

/// Reference to an asset after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Public (HTTPS) URL the asset is served from.
    pub url: String,
    /// Store-assigned identifier used for later deletion.
    pub asset_id: String,
}

/// Errors from the asset store on the primary (upload) path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    /// The request never produced a response (network, DNS, TLS).
    #[error("Asset store request failed: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("Asset store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The store answered but the body was not what we expected.
    #[error("Unexpected asset store response: {0}")]
    InvalidResponse(String),

    /// The upload did not finish within the allotted time.
    #[error("Asset upload timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Outcome of a best-effort asset deletion.
///
/// Deletions never fail the caller; the outcome is only logged.
#[derive(Debug, Clone)]
pub enum DestroyOutcome {
    /// The asset existed and was removed.
    Deleted,
    /// Nothing to delete (no asset id, or the store did not know it).
    NoOp,
    /// The deletion was attempted and failed.
    Failed(AssetError),
}

impl DestroyOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for DestroyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "deleted"),
            Self::NoOp => write!(f, "no-op"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// A remote binary asset store.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload an image into `namespace` and return its URL and identifier.
    async fn upload(
        &self,
        image: &ImageUpload,
        namespace: &str,
    ) -> Result<UploadedAsset, AssetError>;

    /// Delete an asset by identifier. Never returns an error to the caller.
    async fn destroy(&self, asset_id: &str) -> DestroyOutcome;
}
