//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod cracker_repo;
pub mod order_repo;

pub use cracker_repo::CrackerRepo;
pub use order_repo::OrderRepo;
