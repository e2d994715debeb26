//! The record store boundary.
//!
//! [`RecordStore`] is everything the HTTP layer and the catalog coordinator
//! need from persistence. [`PgRecordStore`] is the PostgreSQL implementation;
//! it owns the connection pool and is constructed and closed explicitly.

use async_trait::async_trait;
use crackers_core::types::DbId;

use crate::models::cracker::{CreateCracker, Cracker, CrackerListQuery, UpdateCracker};
use crate::models::order::{NewOrder, Order, OrderListQuery, OrderStatus};
use crate::repositories::{CrackerRepo, OrderRepo};
use crate::DbPool;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors surfaced by a [`RecordStore`].
///
/// Missing rows are not errors: lookups return `Option` and deletes `bool`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {constraint}")]
    Duplicate { constraint: String },

    /// Any other driver or database failure.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::Duplicate {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

/// Create/read/list/count/update/delete over catalog entries and orders.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_cracker(&self, input: &CreateCracker) -> Result<Cracker, StoreError>;

    async fn find_cracker(&self, id: DbId) -> Result<Option<Cracker>, StoreError>;

    async fn list_crackers(&self, query: &CrackerListQuery) -> Result<Vec<Cracker>, StoreError>;

    async fn count_crackers(&self, only_active: bool) -> Result<i64, StoreError>;

    /// Apply a partial update; `None` if the entry does not exist.
    async fn update_cracker(
        &self,
        id: DbId,
        changes: &UpdateCracker,
    ) -> Result<Option<Cracker>, StoreError>;

    async fn set_cracker_active(
        &self,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Cracker>, StoreError>;

    async fn delete_cracker(&self, id: DbId) -> Result<bool, StoreError>;

    /// Insert a whole order. A duplicate order number is [`StoreError::Duplicate`].
    async fn insert_order(&self, input: &NewOrder) -> Result<Order, StoreError>;

    async fn find_order(&self, id: DbId) -> Result<Option<Order>, StoreError>;

    async fn list_orders(&self, query: &OrderListQuery) -> Result<Vec<Order>, StoreError>;

    async fn count_orders(&self) -> Result<i64, StoreError>;

    async fn update_order_status(
        &self,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    async fn delete_order(&self, id: DbId) -> Result<bool, StoreError>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    /// Wrap an existing pool (already migrated).
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect, verify connectivity and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = crate::create_pool(database_url).await?;
        tracing::info!("Database connection pool created");

        crate::health_check(&pool).await?;
        tracing::info!("Database health check passed");

        crate::run_migrations(&pool)
            .await
            .map_err(|e| StoreError::Database(sqlx::Error::Migrate(Box::new(e))))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_cracker(&self, input: &CreateCracker) -> Result<Cracker, StoreError> {
        Ok(CrackerRepo::create(&self.pool, input).await?)
    }

    async fn find_cracker(&self, id: DbId) -> Result<Option<Cracker>, StoreError> {
        Ok(CrackerRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_crackers(&self, query: &CrackerListQuery) -> Result<Vec<Cracker>, StoreError> {
        Ok(CrackerRepo::list(&self.pool, query).await?)
    }

    async fn count_crackers(&self, only_active: bool) -> Result<i64, StoreError> {
        Ok(CrackerRepo::count(&self.pool, only_active).await?)
    }

    async fn update_cracker(
        &self,
        id: DbId,
        changes: &UpdateCracker,
    ) -> Result<Option<Cracker>, StoreError> {
        Ok(CrackerRepo::update(&self.pool, id, changes).await?)
    }

    async fn set_cracker_active(
        &self,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Cracker>, StoreError> {
        Ok(CrackerRepo::set_active(&self.pool, id, is_active).await?)
    }

    async fn delete_cracker(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(CrackerRepo::delete(&self.pool, id).await?)
    }

    async fn insert_order(&self, input: &NewOrder) -> Result<Order, StoreError> {
        Ok(OrderRepo::create(&self.pool, input).await?)
    }

    async fn find_order(&self, id: DbId) -> Result<Option<Order>, StoreError> {
        Ok(OrderRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_orders(&self, query: &OrderListQuery) -> Result<Vec<Order>, StoreError> {
        Ok(OrderRepo::list(&self.pool, query).await?)
    }

    async fn count_orders(&self) -> Result<i64, StoreError> {
        Ok(OrderRepo::count(&self.pool).await?)
    }

    async fn update_order_status(
        &self,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        Ok(OrderRepo::update_status(&self.pool, id, status).await?)
    }

    async fn delete_order(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(OrderRepo::delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
