//! Cart aggregate and related types.

mod aggregate;

pub use aggregate::{Cart, CartLine};

use common::{ProductId, UserId};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The user is not known to the directory.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    /// A line mutation with a non-positive quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The product does not exist in the catalog.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The product exists but is no longer sellable.
    #[error("Product is inactive: {product_id}")]
    ProductInactive { product_id: ProductId },

    /// The cart has no line for this product.
    #[error("Cart line not found for product: {product_id}")]
    LineNotFound { product_id: ProductId },

    /// The requested quantity exceeds the units on hand.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },
}
