//! Order status values, list bounds and sort fields.

use crate::error::CoreError;
use crate::pagination::{PageBounds, Sort, SortDirection, SortField};

/// Order awaiting dispatch.
pub const STATUS_PENDING: &str = "pending";

/// Order handed to the courier.
pub const STATUS_DISPATCHED: &str = "dispatched";

/// Valid order status values.
pub const VALID_ORDER_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_DISPATCHED];

/// Order list page size: 50 by default, at most 200.
pub const ORDER_PAGE_BOUNDS: PageBounds = PageBounds {
    default_limit: 50,
    max_limit: 200,
};

/// Order list default ordering: newest first.
pub const DEFAULT_ORDER_SORT: Sort<OrderSortField> = Sort {
    field: OrderSortField::CreatedAt,
    direction: SortDirection::Desc,
};

/// Validation error for a status outside [`VALID_ORDER_STATUSES`].
pub fn invalid_order_status(status: &str) -> CoreError {
    CoreError::Validation(format!(
        "Invalid status value '{status}'. Must be one of: {VALID_ORDER_STATUSES:?}"
    ))
}

/// Fields the order list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortField {
    CreatedAt,
    UpdatedAt,
    OrderNumber,
    OrderDate,
    CustomerName,
    TotalRate,
    Status,
}

impl SortField for OrderSortField {
    const ALLOWED: &'static [&'static str] = &[
        "createdAt",
        "updatedAt",
        "orderNumber",
        "orderDate",
        "customerName",
        "totalRate",
        "status",
    ];

    fn from_wire(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "orderNumber" => Some(Self::OrderNumber),
            "orderDate" => Some(Self::OrderDate),
            "customerName" => Some(Self::CustomerName),
            "totalRate" => Some(Self::TotalRate),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}
