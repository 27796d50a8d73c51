use serde::{Deserialize, Serialize};

use super::costs;
use super::value_objects::OrderStatus;
use crate::models::{Courier, Customer, LineItem, Order, Restaurant};

// ============================================================================
// Order View - the denormalized read projection
// ============================================================================
//
// Built on demand from independently fetched flat records, never persisted.
// The total is always recomputed from the line items here, so the invariant
// `total_cost == sum(quantity * unit_cost)` holds even if stored rows drift.
//
// ============================================================================

/// A stored line item joined with the name of the product it references.
#[derive(Debug, Clone)]
pub struct NamedLine {
    pub item: LineItem,
    pub product_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProductLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_cost: i64,
    pub line_total: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderView {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_address: String,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub restaurant_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<String>,
    pub status: OrderStatus,
    pub products: Vec<ProductLine>,
    pub total_cost: i64,
}

impl OrderView {
    /// Assemble the projection from flat records. A missing courier is the
    /// normal unassigned case; a stored courier id whose record no longer
    /// resolves keeps the id and omits the name.
    pub fn assemble(
        order: &Order,
        customer: &Customer,
        restaurant: &Restaurant,
        courier: Option<&Courier>,
        lines: &[NamedLine],
    ) -> OrderView {
        let products: Vec<ProductLine> = lines
            .iter()
            .map(|line| ProductLine {
                product_id: line.item.product_id,
                product_name: line.product_name.clone(),
                quantity: line.item.quantity,
                unit_cost: line.item.unit_cost,
                line_total: line.item.line_total(),
            })
            .collect();

        let total_cost = costs::order_total(
            products
                .iter()
                .map(|line| (line.quantity, line.unit_cost)),
        );

        OrderView {
            id: order.id,
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            customer_address: customer.address.clone(),
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name.clone(),
            restaurant_address: restaurant.address.clone(),
            courier_id: order.courier_id,
            courier_name: courier.map(|courier| courier.name.clone()),
            status: order.status,
            products,
            total_cost,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
