//! Catalog form coercion and image validation.
//!
//! Catalog create/update requests arrive as multipart forms, so every field
//! is text until it is coerced here. Image uploads are checked against a
//! content-type allow-list and a size ceiling before any remote call is made.

use std::time::Duration;

use crate::error::CoreError;
use crate::pagination::{PageBounds, Sort, SortDirection, SortField};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Asset store folder that catalog images are uploaded into.
pub const DEFAULT_ASSET_NAMESPACE: &str = "crackers-admin";

/// Upper bound on a single image upload to the asset store.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum accepted image size (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image MIME types. `image/jpg` is not registered but browsers send it.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Catalog list page size: 100 by default, at most 500.
pub const CRACKER_PAGE_BOUNDS: PageBounds = PageBounds {
    default_limit: 100,
    max_limit: 500,
};

/// Catalog list default ordering: newest first.
pub const DEFAULT_CRACKER_SORT: Sort<CrackerSortField> = Sort {
    field: CrackerSortField::CreatedAt,
    direction: SortDirection::Desc,
};

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Fields the catalog list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrackerSortField {
    CreatedAt,
    UpdatedAt,
    EnglishName,
    TamilName,
    OriginalRate,
    DiscountRate,
    Category,
}

impl SortField for CrackerSortField {
    const ALLOWED: &'static [&'static str] = &[
        "createdAt",
        "updatedAt",
        "englishName",
        "tamilName",
        "originalRate",
        "discountRate",
        "category",
    ];

    fn from_wire(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "englishName" => Some(Self::EnglishName),
            "tamilName" => Some(Self::TamilName),
            "originalRate" => Some(Self::OriginalRate),
            "discountRate" => Some(Self::DiscountRate),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Raw text fields of a catalog create or update form.
///
/// `None` means the field was absent from the request, which matters for
/// partial updates: absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CrackerForm {
    pub english_name: Option<String>,
    pub tamil_name: Option<String>,
    pub original_rate: Option<String>,
    pub discount_rate: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl CrackerForm {
    /// Store a multipart text field under its wire name.
    ///
    /// Returns `false` (and stores nothing) for names the form does not know.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "englishName" => &mut self.english_name,
            "tamilName" => &mut self.tamil_name,
            "originalRate" => &mut self.original_rate,
            "discountRate" => &mut self.discount_rate,
            "category" => &mut self.category,
            "status" => &mut self.status,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Require a non-blank text field. The value is returned trimmed.
pub fn require_text(field: &str, value: Option<String>) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(CoreError::Validation(format!("'{field}' must not be blank"))),
        None => Err(CoreError::Validation(format!("'{field}' is required"))),
    }
}

/// Accept an absent field, but reject one that is present and blank.
pub fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, CoreError> {
    value.map(|v| require_text(field, Some(v))).transpose()
}

/// Coerce a text field to a finite, non-negative number.
pub fn coerce_number(field: &str, raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        CoreError::Validation(format!("'{field}' must be a number, got '{raw}'"))
    })?;
    if !value.is_finite() {
        return Err(CoreError::Validation(format!("'{field}' must be a finite number")));
    }
    if value < 0.0 {
        return Err(CoreError::Validation(format!("'{field}' must not be negative")));
    }
    Ok(value)
}

/// Coerce a text field to a boolean (`true`/`false`/`1`/`0`, case-insensitive).
pub fn coerce_bool(field: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(CoreError::Validation(format!(
            "'{field}' must be true or false, got '{raw}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// An image received from a client, not yet uploaded anywhere.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Declared MIME type of the multipart part.
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageUpload {
    /// Check the declared type against [`ALLOWED_IMAGE_TYPES`] and the size
    /// against [`MAX_IMAGE_BYTES`].
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_image_content_type(&self.content_type)?;
        validate_image_size(self.bytes.len())
    }
}

/// Validate a declared image MIME type. Parameters such as `; charset=` are ignored.
pub fn validate_image_content_type(content_type: &str) -> Result<(), CoreError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_IMAGE_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Only image files are allowed (jpeg, png, webp, gif)".to_string(),
        ))
    }
}

/// Validate an image size in bytes.
pub fn validate_image_size(len: usize) -> Result<(), CoreError> {
    if len > MAX_IMAGE_BYTES {
        Err(CoreError::Validation(
            "File size should not exceed 5 MB".to_string(),
        ))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
