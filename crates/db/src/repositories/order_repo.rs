//! Repository for the `orders` table.

use crackers_core::order::OrderSortField;
use crackers_core::pagination::Sort;
use crackers_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::order::{NewOrder, Order, OrderListQuery, OrderStatus};

/// Column list for the `orders` table.
const COLUMNS: &str = "id, order_number, order_date, customer_name, customer_number, \
    customer_address, customer_state, total_rate, status, items, created_at, updated_at";

/// Provides CRUD operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a whole order, items included.
    ///
    /// A duplicate order number violates `uq_orders_order_number`.
    pub async fn create(pool: &PgPool, input: &NewOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders \
                (order_number, order_date, customer_name, customer_number, \
                 customer_address, customer_state, total_rate, status, items) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(&input.order_number)
            .bind(&input.order_date)
            .bind(&input.customer_name)
            .bind(&input.customer_number)
            .bind(&input.customer_address)
            .bind(&input.customer_state)
            .bind(input.total_rate)
            .bind(input.status)
            .bind(Json(&input.items))
            .fetch_one(pool)
            .await
    }

    /// Find an order by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of orders.
    pub async fn list(pool: &PgPool, params: &OrderListQuery) -> Result<Vec<Order>, sqlx::Error> {
        let order_by = order_clause(params.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             ORDER BY {order_by} \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(params.page.limit)
            .bind(params.page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count all orders.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Set the dispatch status. Returns `None` if the order does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("UPDATE orders SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an order. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Build the whitelisted `ORDER BY` clause for an order sort.
fn order_clause(sort: Sort<OrderSortField>) -> String {
    let column = match sort.field {
        OrderSortField::CreatedAt => "created_at",
        OrderSortField::UpdatedAt => "updated_at",
        OrderSortField::OrderNumber => "order_number",
        OrderSortField::OrderDate => "order_date",
        OrderSortField::CustomerName => "customer_name",
        OrderSortField::TotalRate => "total_rate",
        OrderSortField::Status => "status",
    };
    let dir = sort.direction.as_sql();
    format!("{column} {dir}, id {dir}")
}
