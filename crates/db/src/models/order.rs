//! Customer order model and DTOs.
//!
//! Line items are stored inline as JSONB: they are a snapshot taken at order
//! time and do not reference catalog rows.

use crackers_core::error::CoreError;
use crackers_core::order::{
    invalid_order_status, OrderSortField, STATUS_DISPATCHED, STATUS_PENDING,
};
use crackers_core::pagination::{PageRequest, Sort};
use crackers_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// Dispatch status, backed by the `order_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Dispatched,
}

impl OrderStatus {
    /// Parse a wire value, rejecting anything outside the enum.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_DISPATCHED => Ok(Self::Dispatched),
            other => Err(invalid_order_status(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Dispatched => STATUS_DISPATCHED,
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub tamil_name: Option<String>,
    pub quantity: i32,
    pub rate: f64,
    pub amount: f64,
    pub category: Option<String>,
}

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub order_date: String,
    pub customer_name: String,
    pub customer_number: String,
    pub customer_address: String,
    pub customer_state: String,
    pub total_rate: f64,
    pub status: OrderStatus,
    pub items: Json<Vec<OrderItem>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Line item as submitted by the client. `amount` defaults to `quantity * rate`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    #[validate(length(min = 1, message = "item name is required"))]
    pub name: String,
    pub tamil_name: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "rate must not be negative"))]
    pub rate: f64,
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: Option<f64>,
    pub category: Option<String>,
}

impl CreateOrderItem {
    pub fn into_item(self) -> OrderItem {
        let amount = self
            .amount
            .unwrap_or_else(|| f64::from(self.quantity) * self.rate);
        OrderItem {
            name: self.name,
            tamil_name: self.tamil_name,
            quantity: self.quantity,
            rate: self.rate,
            amount,
            category: self.category,
        }
    }
}

/// DTO for creating an order in one request, items included.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(length(min = 1, message = "orderNumber is required"))]
    pub order_number: String,
    #[validate(length(min = 1, message = "orderDate is required"))]
    pub order_date: String,
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customerNumber is required"))]
    pub customer_number: String,
    #[validate(length(min = 1, message = "customerAddress is required"))]
    pub customer_address: String,
    #[validate(length(min = 1, message = "customerState is required"))]
    pub customer_state: String,
    #[validate(range(min = 0.0, message = "totalRate must not be negative"))]
    pub total_rate: f64,
    /// Initial status; defaults to `pending`.
    pub status: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<CreateOrderItem>,
}

/// A validated order ready for insertion.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub order_date: String,
    pub customer_name: String,
    pub customer_number: String,
    pub customer_address: String,
    pub customer_state: String,
    pub total_rate: f64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl CreateOrder {
    /// Run field validation and resolve the status and item amounts.
    pub fn into_new_order(self) -> Result<NewOrder, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let status = match self.status.as_deref() {
            Some(raw) => OrderStatus::parse(raw)?,
            None => OrderStatus::default(),
        };
        Ok(NewOrder {
            order_number: self.order_number.trim().to_string(),
            order_date: self.order_date,
            customer_name: self.customer_name,
            customer_number: self.customer_number,
            customer_address: self.customer_address,
            customer_state: self.customer_state,
            total_rate: self.total_rate,
            status,
            items: self.items.into_iter().map(CreateOrderItem::into_item).collect(),
        })
    }
}

/// Ordering and window for an order list query.
#[derive(Debug, Clone, Copy)]
pub struct OrderListQuery {
    pub sort: Sort<OrderSortField>,
    pub page: PageRequest,
}
