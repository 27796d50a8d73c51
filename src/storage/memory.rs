use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::{Storage, StorageError};
use crate::domain::order::OrderStatus;
use crate::models::{Courier, Customer, LineItem, NewOrder, Order, Product, Restaurant};

// ============================================================================
// In-Memory Storage
// ============================================================================
//
// Backing store for tests and the demo driver. A single RwLock guards every
// table, so an order insert (order row + line-item rows) and a
// compare-and-set status update are each one critical section.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    customers: HashMap<i64, Customer>,
    restaurants: HashMap<i64, Restaurant>,
    couriers: HashMap<i64, Courier>,
    products: HashMap<i64, Product>,
    orders: HashMap<i64, Order>,
    line_items: Vec<LineItem>,
    next_order_id: i64,
}

#[derive(Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::Backend("storage lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::Backend("storage lock poisoned".into()))
    }

    // --- fixture seeding (tests and the demo driver) ---

    pub fn add_customer(&self, customer: Customer) -> Result<(), StorageError> {
        self.write()?.customers.insert(customer.id, customer);
        Ok(())
    }

    pub fn add_restaurant(&self, restaurant: Restaurant) -> Result<(), StorageError> {
        self.write()?.restaurants.insert(restaurant.id, restaurant);
        Ok(())
    }

    pub fn add_courier(&self, courier: Courier) -> Result<(), StorageError> {
        self.write()?.couriers.insert(courier.id, courier);
        Ok(())
    }

    pub fn add_product(&self, product: Product) -> Result<(), StorageError> {
        self.write()?.products.insert(product.id, product);
        Ok(())
    }

    /// Attach a courier to a stored order. Courier assignment is outside the
    /// transition engine's concern, so this stands in for the external
    /// dispatch flow when tests and the demo need an assigned courier.
    pub fn assign_courier(&self, order_id: i64, courier_id: i64) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StorageError::Backend(format!("no such order: {order_id}")))?;
        order.courier_id = Some(courier_id);
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn customer_exists(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.read()?.customers.contains_key(&id))
    }

    async fn restaurant_exists(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.read()?.restaurants.contains_key(&id))
    }

    async fn product_exists(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.read()?.products.contains_key(&id))
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StorageError> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StorageError> {
        Ok(self.read()?.restaurants.get(&id).cloned())
    }

    async fn get_courier(&self, id: i64) -> Result<Option<Courier>, StorageError> {
        Ok(self.read()?.couriers.get(&id).cloned())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StorageError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StorageError> {
        let mut tables = self.write()?;

        tables.next_order_id += 1;
        let id = tables.next_order_id;
        let now = Utc::now();

        let order = Order {
            id,
            customer_id: new_order.customer_id,
            restaurant_id: new_order.restaurant_id,
            courier_id: None,
            status: new_order.status,
            created_at: now,
            updated_at: now,
        };

        // Order row and line-item rows land under the same write lock, so
        // readers never observe a partially created order.
        tables.orders.insert(id, order.clone());
        for line in new_order.lines {
            tables.line_items.push(LineItem {
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            });
        }

        Ok(order)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StorageError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    async fn update_order_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StorageError> {
        let mut tables = self.write()?;

        match tables.orders.get_mut(&id) {
            Some(order) if order.status == from => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError> {
        let tables = self.read()?;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn find_orders_by_restaurant(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<Order>, StorageError> {
        let tables = self.read()?;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn find_orders_by_courier(&self, courier_id: i64) -> Result<Vec<Order>, StorageError> {
        let tables = self.read()?;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.courier_id == Some(courier_id))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn line_items_by_order(&self, order_id: i64) -> Result<Vec<LineItem>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .line_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLineItem;

    fn new_order(customer_id: i64, restaurant_id: i64) -> NewOrder {
        NewOrder {
            customer_id,
            restaurant_id,
            status: OrderStatus::Pending,
            lines: vec![
                NewLineItem {
                    product_id: 2,
                    quantity: 1,
                    unit_cost: 1000,
                },
                NewLineItem {
                    product_id: 3,
                    quantity: 3,
                    unit_cost: 500,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_order_persists_order_and_all_lines() {
        let storage = InMemoryStorage::new();

        let order = storage.insert_order(new_order(3, 1)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.courier_id, None);

        let stored = storage.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);

        let items = storage.line_items_by_order(order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, 2);
        assert_eq!(items[0].unit_cost, 1000);
        assert_eq!(items[1].product_id, 3);
        assert_eq!(items[1].quantity, 3);
    }

    #[tokio::test]
    async fn test_order_ids_are_distinct_and_ascending() {
        let storage = InMemoryStorage::new();

        let first = storage.insert_order(new_order(3, 1)).await.unwrap();
        let second = storage.insert_order(new_order(4, 1)).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_cas_update_applies_only_against_expected_status() {
        let storage = InMemoryStorage::new();
        let order = storage.insert_order(new_order(3, 1)).await.unwrap();

        // stale expectation: no write
        let applied = storage
            .update_order_status(order.id, OrderStatus::InProgress, OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(!applied);
        assert_eq!(
            storage.get_order(order.id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );

        // matching expectation: write applies
        let applied = storage
            .update_order_status(order.id, OrderStatus::Pending, OrderStatus::InProgress)
            .await
            .unwrap();
        assert!(applied);
        assert_eq!(
            storage.get_order(order.id).await.unwrap().unwrap().status,
            OrderStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_cas_update_on_missing_order_does_not_apply() {
        let storage = InMemoryStorage::new();

        let applied = storage
            .update_order_status(42, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_find_orders_filters_by_each_role_column() {
        let storage = InMemoryStorage::new();

        let mine = storage.insert_order(new_order(5, 1)).await.unwrap();
        let theirs = storage.insert_order(new_order(6, 2)).await.unwrap();
        storage.assign_courier(theirs.id, 7).unwrap();

        let by_customer = storage.find_orders_by_customer(5).await.unwrap();
        assert_eq!(by_customer.len(), 1);
        assert_eq!(by_customer[0].id, mine.id);

        let by_restaurant = storage.find_orders_by_restaurant(2).await.unwrap();
        assert_eq!(by_restaurant.len(), 1);
        assert_eq!(by_restaurant[0].id, theirs.id);

        let by_courier = storage.find_orders_by_courier(7).await.unwrap();
        assert_eq!(by_courier.len(), 1);
        assert_eq!(by_courier[0].id, theirs.id);

        assert!(storage.find_orders_by_courier(8).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let storage = InMemoryStorage::new();
        storage
            .add_customer(Customer {
                id: 3,
                name: "Ada".into(),
                address: "123 Main St".into(),
            })
            .unwrap();

        assert!(storage.customer_exists(3).await.unwrap());
        assert!(!storage.customer_exists(4).await.unwrap());
        assert!(!storage.restaurant_exists(1).await.unwrap());
    }
}
