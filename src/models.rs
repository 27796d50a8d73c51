use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::domain::order::{costs, OrderStatus};

// ============================================================================
// Records - flat shapes shared by the domain and the storage collaborator
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Denormalized full address ("street, city, postal code").
    pub address: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Courier {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Current menu price in cents. Orders snapshot this at creation time.
    pub cost: i64,
}

// ============================================================================
// Order rows
// ============================================================================

/// A persisted order. Line items live in their own rows; the total cost is
/// always derived from them, never stored here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    /// Absent until a courier is assigned. Never a sentinel id.
    pub courier_id: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product-and-quantity row within an order. `unit_cost` is the price
/// snapshot taken when the order was created, not a live product reference.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_cost: i64,
}

impl LineItem {
    pub fn line_total(&self) -> i64 {
        costs::line_total(self.quantity, self.unit_cost)
    }
}

// ============================================================================
// Creation inputs
// ============================================================================

/// One requested line in an incoming create-order call: the cost snapshot is
/// taken server-side, so callers only name the product and quantity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// An order ready to persist, with every unit cost already snapshotted.
/// The storage collaborator must write the order and all its lines as one
/// atomic unit.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    pub lines: Vec<NewLineItem>,
}

#[derive(Clone, Debug)]
pub struct NewLineItem {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_cost: i64,
}
