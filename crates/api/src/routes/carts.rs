//! Cart mutation and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use domain::Cart;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::OrderResponse;
use crate::routes::parse_user_id;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_cents: i64,
    pub updated_at: String,
}

pub(crate) fn cart_response(cart: &Cart) -> CartResponse {
    let items = cart
        .lines()
        .iter()
        .map(|line| CartItemResponse {
            product_id: line.product_id.to_string(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            subtotal_cents: line.subtotal().cents(),
        })
        .collect();

    CartResponse {
        user_id: cart.user_id().to_string(),
        items,
        total_cents: cart.total().cents(),
        updated_at: cart.updated_at().to_rfc3339(),
    }
}

// -- Handlers --

/// GET /carts/:user_id — current cart contents and derived total.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let cart = state.carts.snapshot(user_id).await;
    Ok(Json(cart_response(&cart)))
}

/// POST /carts/:user_id/items — add quantity of a product to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let cart = state
        .carts
        .add_line(user_id, ProductId::new(req.product_id), req.quantity)
        .await?;
    Ok(Json(cart_response(&cart)))
}

/// PUT /carts/:user_id/items/:product_id — overwrite a line's quantity.
/// A quantity of zero removes the line.
#[tracing::instrument(skip(state, req))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(String, String)>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let cart = state
        .carts
        .set_line_quantity(user_id, ProductId::new(product_id), req.quantity)
        .await?;
    Ok(Json(cart_response(&cart)))
}

/// DELETE /carts/:user_id/items/:product_id — remove a line.
#[tracing::instrument(skip(state))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let cart = state
        .carts
        .remove_line(user_id, ProductId::new(product_id))
        .await?;
    Ok(Json(cart_response(&cart)))
}

/// DELETE /carts/:user_id — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let cart = state.carts.clear(user_id).await?;
    Ok(Json(cart_response(&cart)))
}

/// POST /carts/:user_id/checkout — convert the cart into a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let order = state
        .orders
        .checkout(user_id, req.shipping_address)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(crate::routes::orders::order_response(&order)),
    ))
}
