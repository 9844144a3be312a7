//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::{CartError, OrderError};
use ledger::LedgerError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Cart operation error.
    Cart(CartError),
    /// Checkout or order lifecycle error.
    Checkout(CheckoutError),
    /// Ledger operation error.
    Ledger(LedgerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Cart(err) => cart_error_to_response(&err),
            ApiError::Checkout(err) => checkout_error_to_response(&err),
            ApiError::Ledger(err) => ledger_error_to_response(&err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: &CartError) -> (StatusCode, String) {
    let status = match err {
        CartError::UserNotFound { .. }
        | CartError::ProductNotFound { .. }
        | CartError::ProductInactive { .. }
        | CartError::LineNotFound { .. } => StatusCode::NOT_FOUND,
        CartError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
        CartError::InsufficientStock { .. } => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}

fn checkout_error_to_response(err: &CheckoutError) -> (StatusCode, String) {
    let status = match err {
        CheckoutError::UserNotFound(_) | CheckoutError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::EmptyCart(_) => StatusCode::BAD_REQUEST,
        CheckoutError::Cart(cart_err) => return cart_error_to_response(cart_err),
        CheckoutError::Order(OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        CheckoutError::Ledger(ledger_err) => return ledger_error_to_response(ledger_err),
    };
    (status, err.to_string())
}

fn ledger_error_to_response(err: &LedgerError) -> (StatusCode, String) {
    let status = match err {
        LedgerError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InsufficientStock { .. } => StatusCode::CONFLICT,
        LedgerError::InvalidStockLevel(_) | LedgerError::InvalidPrice(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, err.to_string())
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}
