//! Crackers store API server library.
//!
//! Exposes the building blocks (config, state, error handling, the catalog
//! coordinator, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod routes;
pub mod state;
