//! Order query and lifecycle transition endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{Order, OrderStatus};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{parse_order_id, parse_user_id};

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub shipping_address: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn order_response(order: &Order) -> OrderResponse {
    let items = order
        .lines()
        .iter()
        .map(|line| OrderItemResponse {
            product_id: line.product_id.to_string(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            subtotal_cents: line.subtotal().cents(),
        })
        .collect();

    OrderResponse {
        id: order.id().to_string(),
        user_id: order.user_id().to_string(),
        status: order.status().to_string(),
        shipping_address: order.shipping_address().to_string(),
        items,
        total_cents: order.total_amount().cents(),
        created_at: order.created_at().to_rfc3339(),
        updated_at: order.updated_at().to_rfc3339(),
    }
}

fn order_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.iter().map(order_response).collect()
}

// -- Handlers --

/// GET /orders — all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<OrderResponse>> {
    Json(order_responses(state.orders.orders().await))
}

/// GET /orders/:id — one order by id.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.order(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// GET /orders/user/:user_id — a user's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let orders = state.orders.orders_for_user(user_id).await?;
    Ok(Json(order_responses(orders)))
}

/// GET /orders/status/:status — all orders in a given status.
#[tracing::instrument(skip(state))]
pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let status = OrderStatus::parse(&status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {status}")))?;
    Ok(Json(order_responses(
        state.orders.orders_by_status(status).await,
    )))
}

/// PATCH /orders/:id/status?status=X — apply a transition by name.
/// A target of CANCELLED goes through the cancellation path and restores
/// stock.
#[tracing::instrument(skip(state))]
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    axum::extract::Query(params): axum::extract::Query<SetStatusParams>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target = OrderStatus::parse(&params.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {}", params.status)))?;

    let order = state.orders.advance(order_id, target).await?;
    Ok(Json(order_response(&order)))
}

#[derive(serde::Deserialize, Debug)]
pub struct SetStatusParams {
    pub status: String,
}

/// GET /orders/recent?since=2026-01-01T00:00:00Z — orders created at or
/// after the given RFC 3339 cutoff, newest first.
#[tracing::instrument(skip(state))]
pub async fn recent(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<RecentParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let cutoff = chrono::DateTime::parse_from_rfc3339(&params.since)
        .map_err(|e| ApiError::BadRequest(format!("Invalid timestamp: {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(Json(order_responses(
        state.orders.orders_since(cutoff).await,
    )))
}

#[derive(serde::Deserialize, Debug)]
pub struct RecentParams {
    pub since: String,
}

/// POST /orders/:id/confirm — mark a pending order confirmed.
#[tracing::instrument(skip(state))]
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.confirm(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/ship — mark a confirmed order shipped.
#[tracing::instrument(skip(state))]
pub async fn ship(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.ship(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/deliver — mark a shipped order delivered.
#[tracing::instrument(skip(state))]
pub async fn deliver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.deliver(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/cancel — cancel a pending or confirmed order,
/// restoring its reserved stock.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.cancel(order_id).await?;
    Ok(Json(order_response(&order)))
}
