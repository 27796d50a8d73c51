use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod metrics;
mod models;
mod storage;
mod utils;

use config::Config;
use domain::order::OrderService;
use models::{Courier, Customer, OrderLineRequest, Product, Restaurant};
use storage::memory::InMemoryStorage;
use storage::postgres::PostgresStorage;
use storage::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,delivery_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order lifecycle service");

    let config = Config::from_env();

    // === 1. Pick the storage collaborator ===
    // The in-memory handle is kept around so the demo can stand in for the
    // external dispatch flow and assign a courier.
    let mut memory: Option<Arc<InMemoryStorage>> = None;
    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to Postgres...");
            Arc::new(PostgresStorage::connect(url).await?)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using seeded in-memory storage");
            let seeded = Arc::new(seed_demo_storage()?);
            memory = Some(seeded.clone());
            seeded
        }
    };

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Wire the order service ===
    let service = OrderService::new(storage, metrics);

    // === 4. Demonstrate the full order lifecycle ===
    tracing::info!("📝 Demonstrating the order lifecycle");

    let view = service
        .create_order(
            3,
            1,
            vec![
                OrderLineRequest {
                    product_id: 2,
                    quantity: 1,
                },
                OrderLineRequest {
                    product_id: 3,
                    quantity: 3,
                },
            ],
        )
        .await?;

    tracing::info!(
        "✅ Order created:\n{}",
        serde_json::to_string_pretty(&view)?
    );

    let order = service.update_order_status(view.id, "in_progress").await?;
    let order = service.update_order_status(order.id, "delivered").await?;
    tracing::info!(order_id = order.id, status = %order.status, "Order ran to completion");

    // Terminal states have no exits
    if let Err(err) = service.update_order_status(order.id, "cancelled").await {
        tracing::warn!(error = %err, "Rejected as expected");
    }

    // A second order that gets cancelled instead
    let second = service
        .create_order(
            3,
            1,
            vec![OrderLineRequest {
                product_id: 1,
                quantity: 2,
            }],
        )
        .await?;
    service.update_order_status(second.id, "cancelled").await?;

    let orders = service.list_orders("customer", 3).await?;
    tracing::info!(count = orders.len(), "Orders for customer 3");

    // Courier assignment happens outside the lifecycle engine; stand in for
    // the dispatch flow, then read the order back through the courier role.
    if let Some(memory) = &memory {
        memory.assign_courier(order.id, 7)?;
        let deliveries = service.list_orders("courier", 7).await?;
        tracing::info!(count = deliveries.len(), "Orders for courier 7");
    }

    if let Err(err) = service.list_orders("bogus", 3).await {
        tracing::warn!(error = %err, "Rejected as expected");
    }

    tracing::info!("🎉 Demo complete");

    Ok(())
}

/// Fixture data for running without a database.
fn seed_demo_storage() -> anyhow::Result<InMemoryStorage> {
    let storage = InMemoryStorage::new();

    storage.add_customer(Customer {
        id: 3,
        name: "Ada Lovelace".into(),
        address: "123 Main St, Montreal, H2X 1Y6".into(),
    })?;
    storage.add_restaurant(Restaurant {
        id: 1,
        name: "Chez Rocket".into(),
        address: "456 Oak Ave, Montreal, H3Z 2B4".into(),
    })?;
    storage.add_courier(Courier {
        id: 7,
        name: "Max Velocity".into(),
    })?;
    storage.add_product(Product {
        id: 1,
        name: "Poutine".into(),
        cost: 899,
    })?;
    storage.add_product(Product {
        id: 2,
        name: "Tourtiere".into(),
        cost: 1000,
    })?;
    storage.add_product(Product {
        id: 3,
        name: "Sugar Pie".into(),
        cost: 500,
    })?;

    Ok(storage)
}
