use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use super::{Storage, StorageError};
use crate::domain::order::OrderStatus;
use crate::models::{Courier, Customer, LineItem, NewOrder, Order, Product, Restaurant};

// ============================================================================
// Postgres Storage
// ============================================================================
//
// Expected schema:
//
//   customers        (id BIGINT PK, name TEXT, address TEXT)
//   restaurants      (id BIGINT PK, name TEXT, address TEXT)
//   couriers         (id BIGINT PK, name TEXT)
//   products         (id BIGINT PK, name TEXT, cost BIGINT)
//   orders           (id BIGSERIAL PK, customer_id BIGINT, restaurant_id BIGINT,
//                     courier_id BIGINT NULL, status TEXT,
//                     created_at TIMESTAMPTZ, updated_at TIMESTAMPTZ)
//   order_line_items (id BIGSERIAL PK, order_id BIGINT, product_id BIGINT,
//                     quantity INT, unit_cost BIGINT)
//
// Creation writes the order row and every line-item row in one transaction;
// status updates are a conditional UPDATE so a stale writer never clobbers a
// concurrent transition.
//
// ============================================================================

pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Unavailable(err.to_string())
            }
            other => StorageError::Backend(other.to_string()),
        }
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, StorageError> {
    let raw_status: String = row.try_get("status")?;
    let status = OrderStatus::parse(&raw_status).ok_or_else(|| {
        StorageError::Backend(format!("unrecognized status in orders row: {raw_status:?}"))
    })?;

    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        restaurant_id: row.try_get("restaurant_id")?,
        courier_id: row.try_get("courier_id")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn line_item_from_row(row: &PgRow) -> Result<LineItem, StorageError> {
    Ok(LineItem {
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        unit_cost: row.try_get("unit_cost")?,
    })
}

async fn exists(pool: &PgPool, query: &str, id: i64) -> Result<bool, StorageError> {
    let row = sqlx::query(query).bind(id).fetch_one(pool).await?;
    Ok(row.try_get(0)?)
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn customer_exists(&self, id: i64) -> Result<bool, StorageError> {
        exists(
            &self.pool,
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
            id,
        )
        .await
    }

    async fn restaurant_exists(&self, id: i64) -> Result<bool, StorageError> {
        exists(
            &self.pool,
            "SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)",
            id,
        )
        .await
    }

    async fn product_exists(&self, id: i64) -> Result<bool, StorageError> {
        exists(
            &self.pool,
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            id,
        )
        .await
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StorageError> {
        let row = sqlx::query("SELECT id, name, address FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Customer {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                address: row.try_get("address")?,
            })
        })
        .transpose()
    }

    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StorageError> {
        let row = sqlx::query("SELECT id, name, address FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Restaurant {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                address: row.try_get("address")?,
            })
        })
        .transpose()
    }

    async fn get_courier(&self, id: i64) -> Result<Option<Courier>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM couriers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Courier {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })
        })
        .transpose()
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StorageError> {
        let row = sqlx::query("SELECT id, name, cost FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Product {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                cost: row.try_get("cost")?,
            })
        })
        .transpose()
    }

    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO orders (customer_id, restaurant_id, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING id",
        )
        .bind(new_order.customer_id)
        .bind(new_order.restaurant_id)
        .bind(new_order.status.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let order_id: i64 = row.try_get("id")?;

        for line in &new_order.lines {
            sqlx::query(
                "INSERT INTO order_line_items (order_id, product_id, quantity, unit_cost) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            customer_id: new_order.customer_id,
            restaurant_id: new_order.restaurant_id,
            courier_id: None,
            status: new_order.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let row = sqlx::query(
            "SELECT id, customer_id, restaurant_id, courier_id, status, created_at, updated_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn update_order_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
        )
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, restaurant_id, courier_id, status, created_at, updated_at \
             FROM orders WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn find_orders_by_restaurant(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<Order>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, restaurant_id, courier_id, status, created_at, updated_at \
             FROM orders WHERE restaurant_id = $1 ORDER BY id",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn find_orders_by_courier(&self, courier_id: i64) -> Result<Vec<Order>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, restaurant_id, courier_id, status, created_at, updated_at \
             FROM orders WHERE courier_id = $1 ORDER BY id",
        )
        .bind(courier_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn line_items_by_order(&self, order_id: i64) -> Result<Vec<LineItem>, StorageError> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, unit_cost \
             FROM order_line_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_item_from_row).collect()
    }
}

// ============================================================================
// Integration Test Notes
// ============================================================================
//
// Everything here needs a live Postgres to exercise:
// - insert_order committing the order row and all line-item rows together,
//   and rolling all of them back on any failure
// - update_order_status applying zero rows when the status has moved
// - the find_orders_by_* filters and row ordering
//
// The in-memory implementation covers the contract in unit tests; backend
// wiring belongs in an integration environment with a seeded schema.
//
// ============================================================================
