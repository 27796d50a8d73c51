use super::errors::OrderError;
use crate::models::OrderLineRequest;
use crate::storage::Storage;

// ============================================================================
// Order Validator
// ============================================================================
//
// Referential checks before an order may be created: the customer, the
// restaurant, and every referenced product must already exist in the store,
// the order must carry at least one line, and every quantity must be
// positive. Read-only; nothing is written here.
//
// ============================================================================

pub struct OrderValidator<'a> {
    storage: &'a dyn Storage,
}

impl<'a> OrderValidator<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    pub async fn validate(
        &self,
        customer_id: i64,
        restaurant_id: i64,
        lines: &[OrderLineRequest],
    ) -> Result<(), OrderError> {
        if !self.storage.customer_exists(customer_id).await? {
            return Err(OrderError::CustomerNotFound(customer_id));
        }

        if !self.storage.restaurant_exists(restaurant_id).await? {
            return Err(OrderError::RestaurantNotFound(restaurant_id));
        }

        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        for line in lines {
            if line.quantity <= 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }

            if !self.storage.product_exists(line.product_id).await? {
                return Err(OrderError::ProductNotFound(line.product_id));
            }
        }

        tracing::debug!(
            customer_id,
            restaurant_id,
            line_count = lines.len(),
            "Order request validated"
        );

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
