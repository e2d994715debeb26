//! Catalog asset coordinator.
//!
//! Keeps a catalog entry and its remote image consistent across two stores
//! that share no transaction. The record store is authoritative; the asset
//! store is only ever written before the record and cleaned up after it:
//!
//! - create/update upload first, then write the record. If the record write
//!   fails the fresh upload is destroyed again (compensation).
//! - an image replacement destroys the previous asset only after the record
//!   points at the new one.
//! - delete removes the record first, then destroys the asset.
//!
//! Asset deletions are best-effort. Their [`DestroyOutcome`] is logged here
//! and never turns a successful record operation into an error.
//!
//! Create, update and delete run on their own Tokio task. A caller that is
//! dropped mid-operation (request timeout, client disconnect) stops waiting,
//! but the asset and record steps still run to completion or compensation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crackers_core::assets::{AssetError, AssetStore, DestroyOutcome, UploadedAsset};
use crackers_core::catalog::{
    CrackerForm, ImageUpload, DEFAULT_ASSET_NAMESPACE, DEFAULT_UPLOAD_TIMEOUT,
};
use crackers_core::error::CoreError;
use crackers_core::types::DbId;
use crackers_db::models::cracker::{CreateCracker, Cracker, UpdateCracker};
use crackers_db::store::{RecordStore, StoreError};
use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

const ENTITY: &str = "Cracker";

/// Errors from a coordinated catalog operation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Invalid input or a missing entry.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The image upload failed or timed out. No record was written.
    #[error("Image upload failed: {0}")]
    Upstream(#[from] AssetError),

    /// The record write failed. Any fresh upload has been compensated.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// The task running the operation panicked or was cancelled.
    #[error("Catalog task failed: {0}")]
    Task(String),
}

/// Where images go and how long an upload may take.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub namespace: String,
    pub upload_timeout: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_ASSET_NAMESPACE.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

/// Orchestrates catalog writes across the record and asset stores.
///
/// Cloning is cheap and clones share the per-entry locks.
#[derive(Clone)]
pub struct CatalogCoordinator {
    records: Arc<dyn RecordStore>,
    assets: Arc<dyn AssetStore>,
    settings: CatalogSettings,
    locks: Arc<EntryLocks>,
}

impl CatalogCoordinator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        assets: Arc<dyn AssetStore>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            records,
            assets,
            settings,
            locks: Arc::default(),
        }
    }

    /// Create an entry, uploading its image first when one is supplied.
    ///
    /// Input is fully validated before any remote call. If the insert fails
    /// after a successful upload, the upload is destroyed and the insert
    /// error is returned.
    pub async fn create(
        &self,
        form: CrackerForm,
        image: Option<ImageUpload>,
    ) -> Result<Cracker, CatalogError> {
        let this = self.clone();
        run_detached(async move { this.create_entry(form, image).await }).await
    }

    async fn create_entry(
        &self,
        form: CrackerForm,
        image: Option<ImageUpload>,
    ) -> Result<Cracker, CatalogError> {
        let mut input = CreateCracker::from_form(form)?;
        if let Some(image) = &image {
            image.validate()?;
        }

        let uploaded = match &image {
            Some(image) => Some(self.upload(image).await?),
            None => None,
        };
        input.image = uploaded.clone();

        match self.records.insert_cracker(&input).await {
            Ok(cracker) => {
                tracing::info!(
                    cracker_id = cracker.id,
                    has_image = cracker.image_public_id.is_some(),
                    "Cracker created"
                );
                Ok(cracker)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to insert cracker");
                if let Some(asset) = &uploaded {
                    self.compensate(asset, None).await;
                }
                Err(err.into())
            }
        }
    }

    /// Apply a partial update, optionally replacing the image.
    ///
    /// With a new image the order is: upload, update the record, then destroy
    /// the previous asset. A failed record update destroys the new upload and
    /// leaves the previous asset and record untouched.
    pub async fn update(
        &self,
        id: DbId,
        form: CrackerForm,
        image: Option<ImageUpload>,
    ) -> Result<Cracker, CatalogError> {
        let this = self.clone();
        run_detached(async move { this.update_entry(id, form, image).await }).await
    }

    async fn update_entry(
        &self,
        id: DbId,
        form: CrackerForm,
        image: Option<ImageUpload>,
    ) -> Result<Cracker, CatalogError> {
        let mut changes = UpdateCracker::from_form(form)?;
        if let Some(image) = &image {
            image.validate()?;
        }

        let _guard = self.locks.acquire(id).await;

        let existing = self
            .records
            .find_cracker(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let Some(image) = image else {
            let updated = self
                .records
                .update_cracker(id, &changes)
                .await?
                .ok_or_else(|| not_found(id))?;
            tracing::info!(cracker_id = id, "Cracker updated");
            return Ok(updated);
        };

        let uploaded = self.upload(&image).await?;
        changes.image = Some(uploaded.clone());

        let updated = match self.records.update_cracker(id, &changes).await {
            Ok(Some(cracker)) => cracker,
            Ok(None) => {
                tracing::warn!(cracker_id = id, "Cracker vanished during update");
                self.compensate(&uploaded, Some(id)).await;
                return Err(not_found(id));
            }
            Err(err) => {
                tracing::error!(cracker_id = id, error = %err, "Failed to update cracker");
                self.compensate(&uploaded, Some(id)).await;
                return Err(err.into());
            }
        };

        if let Some(previous) = existing.image_asset_id() {
            if previous != uploaded.asset_id {
                let outcome = self.assets.destroy(previous).await;
                log_destroy(&outcome, previous, id, "previous image");
            }
        }

        tracing::info!(cracker_id = id, asset_id = %uploaded.asset_id, "Cracker image replaced");
        Ok(updated)
    }

    /// Overwrite the active flag. Idempotent and free of asset I/O.
    pub async fn set_active(&self, id: DbId, is_active: bool) -> Result<Cracker, CatalogError> {
        let cracker = self
            .records
            .set_cracker_active(id, is_active)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(cracker_id = id, is_active, "Cracker status set");
        Ok(cracker)
    }

    /// Delete the record, then its image.
    ///
    /// The returned outcome describes the asset deletion only; the operation
    /// itself has succeeded once the record is gone.
    pub async fn delete(&self, id: DbId) -> Result<DestroyOutcome, CatalogError> {
        let this = self.clone();
        run_detached(async move { this.delete_entry(id).await }).await
    }

    async fn delete_entry(&self, id: DbId) -> Result<DestroyOutcome, CatalogError> {
        let _guard = self.locks.acquire(id).await;

        let existing = self
            .records
            .find_cracker(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if !self.records.delete_cracker(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(cracker_id = id, "Cracker deleted");

        let outcome = match existing.image_asset_id() {
            Some(asset_id) => {
                let outcome = self.assets.destroy(asset_id).await;
                log_destroy(&outcome, asset_id, id, "deleted cracker image");
                outcome
            }
            None => DestroyOutcome::NoOp,
        };
        Ok(outcome)
    }

    /// Upload under the configured namespace, bounded by the upload timeout.
    async fn upload(&self, image: &ImageUpload) -> Result<UploadedAsset, AssetError> {
        let timeout = self.settings.upload_timeout;
        let upload = self.assets.upload(image, &self.settings.namespace);
        match tokio::time::timeout(timeout, upload).await {
            Ok(Ok(asset)) => Ok(asset),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Image upload failed");
                Err(err)
            }
            Err(_) => {
                // The remote side may still finish; that asset is never seen
                // and stays orphaned.
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    namespace = %self.settings.namespace,
                    "Image upload timed out; a late upload would be orphaned"
                );
                Err(AssetError::Timeout(timeout))
            }
        }
    }

    /// Destroy an upload whose record write failed.
    async fn compensate(&self, asset: &UploadedAsset, cracker_id: Option<DbId>) {
        let outcome = self.assets.destroy(&asset.asset_id).await;
        match &outcome {
            DestroyOutcome::Failed(err) => tracing::error!(
                asset_id = %asset.asset_id,
                cracker_id,
                error = %err,
                "Compensating image delete failed; asset is orphaned"
            ),
            other => tracing::info!(
                asset_id = %asset.asset_id,
                cracker_id,
                outcome = %other,
                "Compensated image upload"
            ),
        }
    }
}

/// Spawn `work` in the current span and wait for it.
///
/// Dropping the returned future detaches the task instead of cancelling it.
async fn run_detached<T, F>(work: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, CatalogError>> + Send + 'static,
{
    tokio::spawn(work.in_current_span())
        .await
        .map_err(|e| CatalogError::Task(e.to_string()))?
}

fn not_found(id: DbId) -> CatalogError {
    CatalogError::Core(CoreError::NotFound { entity: ENTITY, id })
}

fn log_destroy(outcome: &DestroyOutcome, asset_id: &str, cracker_id: DbId, what: &str) {
    match outcome {
        DestroyOutcome::Failed(err) => tracing::warn!(
            cracker_id,
            asset_id,
            error = %err,
            "Failed to delete {what}"
        ),
        other => tracing::debug!(cracker_id, asset_id, outcome = %other, "Deleted {what}"),
    }
}

/// Per-entry async locks serializing update and delete of the same id.
///
/// Idle entries are pruned on every acquire.
#[derive(Default)]
struct EntryLocks {
    entries: Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>,
}

impl EntryLocks {
    async fn acquire(&self, id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(entries.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
