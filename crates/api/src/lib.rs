//! HTTP API server with observability for the commerce engine.
//!
//! Provides REST endpoints for cart mutation, checkout, order lifecycle
//! transitions, and administrative product/stock management, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use checkout::{CartService, CartStore, InMemoryDirectory, OrderService, OrderStore};
use ledger::StockLedger;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Cart service as wired by this server.
pub type Carts = CartService<StockLedger, InMemoryDirectory>;

/// Order service as wired by this server.
pub type Orders = OrderService<InMemoryDirectory>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub ledger: StockLedger,
    pub directory: InMemoryDirectory,
    pub carts: Carts,
    pub orders: Orders,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::create))
        .route("/products", post(routes::products::upsert))
        .route(
            "/products/{id}",
            get(routes::products::get).delete(routes::products::deactivate),
        )
        .route("/products/{id}/stock", put(routes::products::set_stock))
        .route(
            "/products/{id}/stock/reduce",
            post(routes::products::reduce_stock),
        )
        .route(
            "/carts/{user_id}",
            get(routes::carts::get).delete(routes::carts::clear),
        )
        .route("/carts/{user_id}/items", post(routes::carts::add_item))
        .route(
            "/carts/{user_id}/items/{product_id}",
            put(routes::carts::update_item).delete(routes::carts::remove_item),
        )
        .route("/carts/{user_id}/checkout", post(routes::carts::checkout))
        .route("/orders", get(routes::orders::list))
        .route("/orders/recent", get(routes::orders::recent))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/user/{user_id}", get(routes::orders::by_user))
        .route("/orders/status/{status}", get(routes::orders::by_status))
        .route("/orders/{id}/status", patch(routes::orders::set_status))
        .route("/orders/{id}/confirm", post(routes::orders::confirm))
        .route("/orders/{id}/ship", post(routes::orders::ship))
        .route("/orders/{id}/deliver", post(routes::orders::deliver))
        .route("/orders/{id}/cancel", post(routes::orders::cancel))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory stores.
pub fn create_default_state() -> Arc<AppState> {
    let ledger = StockLedger::new();
    let directory = InMemoryDirectory::new();
    let cart_store = CartStore::new();
    let order_store = OrderStore::new();

    let carts = CartService::new(ledger.clone(), directory.clone(), cart_store.clone());
    let orders = OrderService::new(ledger.clone(), directory.clone(), cart_store, order_store);

    Arc::new(AppState {
        ledger,
        directory,
        carts,
        orders,
    })
}
