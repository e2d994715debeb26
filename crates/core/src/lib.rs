//! Domain types and pure logic for the crackers store backend.
//!
//! Nothing in this crate performs I/O. The remote asset store is described
//! by the [`assets::AssetStore`] trait and implemented elsewhere.

pub mod assets;
pub mod catalog;
pub mod error;
pub mod order;
pub mod pagination;
pub mod types;
