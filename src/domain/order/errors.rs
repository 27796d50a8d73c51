use super::value_objects::OrderStatus;
use crate::storage::StorageError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    #[error("Restaurant {0} not found")]
    RestaurantNotFound(i64),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Order must contain at least one line item")]
    EmptyOrder,

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("Cannot transition order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Unrecognized order status: {0:?}")]
    UnknownStatus(String),

    #[error("Unrecognized requester role: {0:?}")]
    InvalidRole(String),

    #[error("Storage failure: {0}")]
    Internal(#[from] StorageError),
}

impl OrderError {
    /// Stable label for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::CustomerNotFound(_) => "customer_not_found",
            OrderError::RestaurantNotFound(_) => "restaurant_not_found",
            OrderError::ProductNotFound(_) => "product_not_found",
            OrderError::OrderNotFound(_) => "order_not_found",
            OrderError::EmptyOrder => "empty_order",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::InvalidTransition { .. } => "invalid_transition",
            OrderError::UnknownStatus(_) => "unknown_status",
            OrderError::InvalidRole(_) => "invalid_role",
            OrderError::Internal(_) => "internal",
        }
    }
}
