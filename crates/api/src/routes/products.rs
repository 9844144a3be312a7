//! Administrative product and stock endpoints.
//!
//! All stock edits go through the ledger; nothing here touches carts or
//! orders.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Money, ProductId};
use ledger::{Catalog, Product};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct UpsertProductRequest {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct SetStockRequest {
    pub stock: i64,
}

#[derive(Deserialize)]
pub struct ReduceStockRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
    pub active: bool,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub stock: i64,
}

fn product_response(product: Product) -> ProductResponse {
    ProductResponse {
        id: product.id.to_string(),
        name: product.name,
        price_cents: product.price.cents(),
        stock: product.stock,
        active: product.active,
    }
}

// -- Handlers --

/// POST /products — register a product or replace its registration.
#[tracing::instrument(skip(state, req))]
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = Product {
        id: ProductId::new(req.id),
        name: req.name,
        price: Money::from_cents(req.price_cents),
        stock: req.stock,
        active: req.active,
    };

    state.ledger.upsert_product(product.clone()).await?;
    Ok((StatusCode::CREATED, Json(product_response(product))))
}

/// GET /products/:id — read one product through the catalog view.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.ledger.product(&ProductId::new(id)).await?;
    Ok(Json(product_response(product)))
}

/// DELETE /products/:id — deactivate a product (its stock counter stays).
#[tracing::instrument(skip(state))]
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.ledger.deactivate(&ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /products/:id/stock — administrative absolute stock set.
#[tracing::instrument(skip(state, req))]
pub async fn set_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let stock = state.ledger.set_stock(&product_id, req.stock).await?;

    Ok(Json(StockResponse {
        product_id: product_id.to_string(),
        stock,
    }))
}

/// POST /products/:id/stock/reduce — administrative direct stock reduction.
#[tracing::instrument(skip(state, req))]
pub async fn reduce_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReduceStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let stock = state.ledger.reserve(&product_id, req.quantity).await?;

    Ok(Json(StockResponse {
        product_id: product_id.to_string(),
        stock,
    }))
}
