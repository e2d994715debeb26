//! Remote asset store clients.
//!
//! [`cloudinary::CloudinaryAssetStore`] implements
//! [`crackers_core::assets::AssetStore`] against the Cloudinary upload API.

pub mod cloudinary;
pub mod config;
pub mod signing;
