//! Cloudinary-backed [`AssetStore`].
//!
//! Uploads use the signed `image/upload` endpoint with `overwrite=false`, so
//! every upload gets a fresh public id. Deletes use `image/destroy` with CDN
//! invalidation; Cloudinary answers `{"result":"not found"}` for unknown ids,
//! which is reported as [`DestroyOutcome::NoOp`].

use async_trait::async_trait;
use crackers_core::assets::{AssetError, AssetStore, DestroyOutcome, UploadedAsset};
use crackers_core::catalog::ImageUpload;
use serde::Deserialize;

use crate::config::CloudinaryConfig;
use crate::signing::sign;

/// Public Cloudinary API root.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// HTTP client for one Cloudinary account.
pub struct CloudinaryAssetStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryAssetStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_api_base(config, DEFAULT_API_BASE.to_string())
    }

    /// Point the client at a different API root (used against local fakes).
    pub fn with_api_base(config: CloudinaryConfig, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{action}",
            self.api_base, self.config.cloud_name
        )
    }

    async fn try_destroy(&self, asset_id: &str) -> Result<DestroyOutcome, AssetError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("invalidate", "true"),
                ("public_id", asset_id),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", asset_id),
                ("invalidate", "true"),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(transport)?;

        let body: DestroyResponse = parse_response(response).await?;
        Ok(interpret_destroy_result(&body.result))
    }
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(
        &self,
        image: &ImageUpload,
        namespace: &str,
    ) -> Result<UploadedAsset, AssetError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", namespace),
                ("overwrite", "false"),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let file = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone().unwrap_or_else(|| "upload".into()))
            .mime_str(&image.content_type)
            .map_err(|e| AssetError::InvalidResponse(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", namespace.to_string())
            .text("overwrite", "false")
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let body: UploadResponse = parse_response(response).await?;
        tracing::debug!(asset_id = %body.public_id, "Image uploaded");
        Ok(UploadedAsset {
            url: body.secure_url,
            asset_id: body.public_id,
        })
    }

    async fn destroy(&self, asset_id: &str) -> DestroyOutcome {
        if asset_id.is_empty() {
            return DestroyOutcome::NoOp;
        }
        self.try_destroy(asset_id)
            .await
            .unwrap_or_else(DestroyOutcome::Failed)
    }
}

/// Map the `result` field of a destroy response to an outcome.
pub fn interpret_destroy_result(result: &str) -> DestroyOutcome {
    match result {
        "ok" => DestroyOutcome::Deleted,
        "not found" => DestroyOutcome::NoOp,
        other => DestroyOutcome::Failed(AssetError::InvalidResponse(format!(
            "destroy returned result '{other}'"
        ))),
    }
}

fn transport(err: reqwest::Error) -> AssetError {
    AssetError::Transport(err.to_string())
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AssetError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssetError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| AssetError::InvalidResponse(e.to_string()))
}
