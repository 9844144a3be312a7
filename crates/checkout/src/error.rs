//! Checkout error types.

use common::{OrderId, UserId};
use domain::{CartError, OrderError};
use ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during checkout and order lifecycle operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user is not known to the directory.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// No order exists with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Checkout was attempted with no cart lines.
    #[error("Cart is empty for user: {0}")]
    EmptyCart(UserId),

    /// Cart error.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order error.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Ledger error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
