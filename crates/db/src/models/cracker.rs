//! Catalog entry ("cracker") model and DTOs.
//!
//! Field names serialize in camelCase and the active flag is exposed as
//! `status`, matching the storefront clients.

use crackers_core::assets::UploadedAsset;
use crackers_core::catalog::{
    coerce_bool, coerce_number, optional_text, require_text, CrackerForm, CrackerSortField,
};
use crackers_core::error::CoreError;
use crackers_core::pagination::{PageRequest, Sort};
use crackers_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `crackers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cracker {
    pub id: DbId,
    pub english_name: String,
    pub tamil_name: String,
    pub original_rate: f64,
    pub discount_rate: f64,
    pub category: String,
    #[serde(rename = "status")]
    pub is_active: bool,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cracker {
    /// Asset store id of the attached image, if any.
    pub fn image_asset_id(&self) -> Option<&str> {
        self.image_public_id.as_deref()
    }
}

/// DTO for inserting a catalog entry.
#[derive(Debug, Clone)]
pub struct CreateCracker {
    pub english_name: String,
    pub tamil_name: String,
    pub original_rate: f64,
    pub discount_rate: f64,
    pub category: String,
    pub is_active: bool,
    pub image: Option<UploadedAsset>,
}

impl CreateCracker {
    /// Coerce a create form. All text and numeric fields are required;
    /// `status` defaults to `true`. The image is attached later, after upload.
    pub fn from_form(form: CrackerForm) -> Result<Self, CoreError> {
        let original_rate = require_text("originalRate", form.original_rate)?;
        let discount_rate = require_text("discountRate", form.discount_rate)?;
        Ok(Self {
            english_name: require_text("englishName", form.english_name)?,
            tamil_name: require_text("tamilName", form.tamil_name)?,
            original_rate: coerce_number("originalRate", &original_rate)?,
            discount_rate: coerce_number("discountRate", &discount_rate)?,
            category: require_text("category", form.category)?,
            is_active: match form.status {
                Some(raw) => coerce_bool("status", &raw)?,
                None => true,
            },
            image: None,
        })
    }
}

/// DTO for a partial update. `None` fields are left untouched.
///
/// `image`, when set, replaces both image columns at once.
#[derive(Debug, Clone, Default)]
pub struct UpdateCracker {
    pub english_name: Option<String>,
    pub tamil_name: Option<String>,
    pub original_rate: Option<f64>,
    pub discount_rate: Option<f64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub image: Option<UploadedAsset>,
}

impl UpdateCracker {
    /// Coerce only the fields present in the form.
    pub fn from_form(form: CrackerForm) -> Result<Self, CoreError> {
        Ok(Self {
            english_name: optional_text("englishName", form.english_name)?,
            tamil_name: optional_text("tamilName", form.tamil_name)?,
            original_rate: form
                .original_rate
                .map(|raw| coerce_number("originalRate", &raw))
                .transpose()?,
            discount_rate: form
                .discount_rate
                .map(|raw| coerce_number("discountRate", &raw))
                .transpose()?,
            category: optional_text("category", form.category)?,
            is_active: form
                .status
                .map(|raw| coerce_bool("status", &raw))
                .transpose()?,
            image: None,
        })
    }
}

/// Filter, ordering and window for a catalog list query.
#[derive(Debug, Clone, Copy)]
pub struct CrackerListQuery {
    pub only_active: bool,
    pub sort: Sort<CrackerSortField>,
    pub page: PageRequest,
}
