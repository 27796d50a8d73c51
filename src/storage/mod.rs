pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::order::OrderStatus;
use crate::models::{Courier, Customer, LineItem, NewOrder, Order, Product, Restaurant};
use crate::utils::retry::IsTransient;

// ============================================================================
// Storage Collaborator - the persistence seam
// ============================================================================
//
// The order engine never talks to a database directly; it is handed a
// `Storage` implementation explicitly (no ambient/global handle). The two
// implementations are:
// - `memory::InMemoryStorage` for tests and the demo driver
// - `postgres::PostgresStorage` for a real backend
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transient: the backend could not be reached or timed out.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Permanent: the backend answered but the operation failed.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A conditional write lost against a concurrent one too many times.
    #[error("Storage contention: {0}")]
    Contention(String),
}

impl IsTransient for StorageError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Unavailable(_) | StorageError::Contention(_)
        )
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    // --- existence checks (creation-time referential validation) ---
    async fn customer_exists(&self, id: i64) -> Result<bool, StorageError>;
    async fn restaurant_exists(&self, id: i64) -> Result<bool, StorageError>;
    async fn product_exists(&self, id: i64) -> Result<bool, StorageError>;

    // --- entity lookups (read-side aggregation) ---
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StorageError>;
    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StorageError>;
    async fn get_courier(&self, id: i64) -> Result<Option<Courier>, StorageError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, StorageError>;

    // --- order persistence ---

    /// Persist an order together with ALL of its line items as one atomic
    /// unit: either everything exists afterwards, or nothing does.
    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StorageError>;

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StorageError>;

    /// Compare-and-set status update: the write applies only if the stored
    /// status still equals `from`. Returns whether the write applied.
    async fn update_order_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StorageError>;

    async fn find_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError>;
    async fn find_orders_by_restaurant(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<Order>, StorageError>;
    async fn find_orders_by_courier(&self, courier_id: i64) -> Result<Vec<Order>, StorageError>;

    /// Line items for one order, in insertion order.
    async fn line_items_by_order(&self, order_id: i64) -> Result<Vec<LineItem>, StorageError>;
}
