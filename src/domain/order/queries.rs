use super::value_objects::Role;
use crate::models::Order;
use crate::storage::{Storage, StorageError};

// ============================================================================
// Order Query Router
// ============================================================================
//
// Dispatches a "list orders" request to the storage lookup matching the
// requester's role. An empty result is a normal answer, never an error;
// whether the subject itself exists is the caller's concern.
//
// ============================================================================

pub async fn orders_for(
    storage: &dyn Storage,
    role: Role,
    subject_id: i64,
) -> Result<Vec<Order>, StorageError> {
    match role {
        Role::Customer => storage.find_orders_by_customer(subject_id).await,
        Role::Restaurant => storage.find_orders_by_restaurant(subject_id).await,
        Role::Courier => storage.find_orders_by_courier(subject_id).await,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::models::{NewLineItem, NewOrder};
    use crate::storage::memory::InMemoryStorage;

    async fn storage_with_orders() -> (InMemoryStorage, i64, i64) {
        let storage = InMemoryStorage::new();

        let for_customer_5 = storage
            .insert_order(NewOrder {
                customer_id: 5,
                restaurant_id: 1,
                status: OrderStatus::Pending,
                lines: vec![NewLineItem {
                    product_id: 2,
                    quantity: 1,
                    unit_cost: 1000,
                }],
            })
            .await
            .unwrap();

        let for_customer_6 = storage
            .insert_order(NewOrder {
                customer_id: 6,
                restaurant_id: 2,
                status: OrderStatus::Pending,
                lines: vec![NewLineItem {
                    product_id: 3,
                    quantity: 2,
                    unit_cost: 500,
                }],
            })
            .await
            .unwrap();
        storage.assign_courier(for_customer_6.id, 7).unwrap();

        (storage, for_customer_5.id, for_customer_6.id)
    }

    #[tokio::test]
    async fn test_dispatch_by_customer() {
        let (storage, first_id, _) = storage_with_orders().await;

        let orders = orders_for(&storage, Role::Customer, 5).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, first_id);
    }

    #[tokio::test]
    async fn test_dispatch_by_restaurant() {
        let (storage, _, second_id) = storage_with_orders().await;

        let orders = orders_for(&storage, Role::Restaurant, 2).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, second_id);
    }

    #[tokio::test]
    async fn test_dispatch_by_courier() {
        let (storage, _, second_id) = storage_with_orders().await;

        let orders = orders_for(&storage, Role::Courier, 7).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, second_id);
    }

    #[tokio::test]
    async fn test_no_matches_is_an_empty_list() {
        let (storage, _, _) = storage_with_orders().await;

        let orders = orders_for(&storage, Role::Customer, 999).await.unwrap();
        assert!(orders.is_empty());
    }
}
