use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use super::errors::OrderError;
use super::queries;
use super::transitions;
use super::validator::OrderValidator;
use super::value_objects::{OrderStatus, Role};
use super::view::{NamedLine, OrderView};
use crate::metrics::Metrics;
use crate::models::{NewLineItem, NewOrder, Order, OrderLineRequest};
use crate::storage::{Storage, StorageError};
use crate::utils::retry::{retry_on_transient, RetryConfig};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: validation → cost snapshot → atomic persist → projection.
//
// The storage collaborator is handed in explicitly; the service keeps no
// state of its own between calls, so every invocation is self-contained
// given its inputs and the store's current data.
//
// ============================================================================

/// Bounded attempts for the optimistic status-update loop.
const MAX_STATUS_ATTEMPTS: u32 = 3;

pub struct OrderService {
    storage: Arc<dyn Storage>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(storage: Arc<dyn Storage>, metrics: Arc<Metrics>) -> Self {
        Self { storage, metrics }
    }

    /// Create an order for a customer at a restaurant. On success the order
    /// and all of its line items are persisted as one unit with initial
    /// status `pending`, and the full read projection is returned.
    pub async fn create_order(
        &self,
        customer_id: i64,
        restaurant_id: i64,
        lines: Vec<OrderLineRequest>,
    ) -> Result<OrderView, OrderError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        tracing::info!(
            %request_id,
            customer_id,
            restaurant_id,
            line_count = lines.len(),
            "Creating order"
        );

        let result = self.do_create_order(customer_id, restaurant_id, &lines).await;
        self.metrics
            .observe_duration("create_order", started.elapsed().as_secs_f64());

        match &result {
            Ok(view) => {
                self.metrics.record_order_created();
                tracing::info!(
                    %request_id,
                    order_id = view.id,
                    total_cost = view.total_cost,
                    "✅ Order created"
                );
            }
            Err(error) => {
                self.metrics.record_failure("create_order", error.reason());
                tracing::warn!(%request_id, error = %error, "Order creation failed");
            }
        }

        result
    }

    /// Apply a requested status change to an order. The token is parsed
    /// case-insensitively at this boundary; the transition engine only ever
    /// sees the closed enum.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        requested: &str,
    ) -> Result<Order, OrderError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        tracing::info!(%request_id, order_id, requested, "Updating order status");

        let result = self.do_update_order_status(order_id, requested).await;
        self.metrics
            .observe_duration("update_status", started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                tracing::info!(
                    %request_id,
                    order_id,
                    status = %order.status,
                    "✅ Order status updated"
                );
            }
            Err(error) => {
                self.metrics.record_failure("update_status", error.reason());
                tracing::warn!(%request_id, order_id, error = %error, "Status update rejected");
            }
        }

        result
    }

    /// List the orders visible to a requester role: the customer who placed
    /// them, the restaurant fulfilling them, or the courier delivering them.
    pub async fn list_orders(
        &self,
        role: &str,
        subject_id: i64,
    ) -> Result<Vec<OrderView>, OrderError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let result = self.do_list_orders(role, subject_id).await;
        self.metrics
            .observe_duration("list_orders", started.elapsed().as_secs_f64());

        match &result {
            Ok(views) => {
                tracing::info!(%request_id, role, subject_id, count = views.len(), "Orders listed");
            }
            Err(error) => {
                self.metrics.record_failure("list_orders", error.reason());
                tracing::warn!(%request_id, role, subject_id, error = %error, "List query rejected");
            }
        }

        result
    }

    async fn do_create_order(
        &self,
        customer_id: i64,
        restaurant_id: i64,
        lines: &[OrderLineRequest],
    ) -> Result<OrderView, OrderError> {
        OrderValidator::new(self.storage.as_ref())
            .validate(customer_id, restaurant_id, lines)
            .await?;

        // Unit costs are snapshotted now; later menu price changes never
        // reprice an existing order.
        let mut new_lines = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .storage
                .get_product(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;
            new_lines.push(NewLineItem {
                product_id: product.id,
                quantity: line.quantity,
                unit_cost: product.cost,
            });
        }

        let order = self
            .storage
            .insert_order(NewOrder {
                customer_id,
                restaurant_id,
                status: OrderStatus::Pending,
                lines: new_lines,
            })
            .await?;

        self.aggregate(&order).await
    }

    async fn do_update_order_status(
        &self,
        order_id: i64,
        requested: &str,
    ) -> Result<Order, OrderError> {
        let requested = OrderStatus::parse(requested)
            .ok_or_else(|| OrderError::UnknownStatus(requested.to_string()))?;

        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let order = self
                .storage
                .get_order(order_id)
                .await?
                .ok_or(OrderError::OrderNotFound(order_id))?;

            let next = transitions::transition(order.status, requested)?;

            // The write is conditioned on the exact status the decision was
            // made against; if a concurrent update got there first it is a
            // no-op and the loop re-reads.
            if self
                .storage
                .update_order_status(order_id, order.status, next)
                .await?
            {
                self.metrics
                    .record_transition(order.status.as_str(), next.as_str());
                return Ok(Order {
                    status: next,
                    ..order
                });
            }

            tracing::warn!(order_id, attempt, "Concurrent status update, re-reading");
        }

        Err(OrderError::Internal(StorageError::Contention(format!(
            "order {order_id} status update lost {MAX_STATUS_ATTEMPTS} races"
        ))))
    }

    async fn do_list_orders(
        &self,
        role: &str,
        subject_id: i64,
    ) -> Result<Vec<OrderView>, OrderError> {
        let role = Role::parse(role).ok_or_else(|| OrderError::InvalidRole(role.to_string()))?;
        self.metrics.record_list_query(role.as_str());

        // Lookup is read-only and idempotent, so transient backend failures
        // are retried here before surfacing.
        let orders = retry_on_transient(RetryConfig::conservative(), |_attempt| {
            queries::orders_for(self.storage.as_ref(), role, subject_id)
        })
        .await
        .into_result()?;

        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(self.aggregate(order).await?);
        }

        Ok(views)
    }

    /// Rebuild the full read projection for one stored order from
    /// independently fetched flat records.
    async fn aggregate(&self, order: &Order) -> Result<OrderView, OrderError> {
        let (customer, restaurant) = tokio::try_join!(
            self.storage.get_customer(order.customer_id),
            self.storage.get_restaurant(order.restaurant_id)
        )?;

        let customer = customer.ok_or(OrderError::CustomerNotFound(order.customer_id))?;
        let restaurant = restaurant.ok_or(OrderError::RestaurantNotFound(order.restaurant_id))?;

        // Unassigned courier is the normal case; a dangling courier id keeps
        // the id in the view with no name.
        let courier = match order.courier_id {
            Some(courier_id) => self.storage.get_courier(courier_id).await?,
            None => None,
        };

        let items = self.storage.line_items_by_order(order.id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .storage
                .get_product(item.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_id))?;
            lines.push(NamedLine {
                item,
                product_name: product.name,
            });
        }

        Ok(OrderView::assemble(
            order,
            &customer,
            &restaurant,
            courier.as_ref(),
            &lines,
        ))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
