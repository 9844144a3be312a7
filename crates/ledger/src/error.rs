use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The product is not registered in the store.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A reservation asked for more units than are on hand.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// An administrative stock set with a negative target.
    #[error("Invalid stock level: {0} (must not be negative)")]
    InvalidStockLevel(i64),

    /// A product registered with a non-positive price.
    #[error("Invalid price: {0} cents (must be greater than 0)")]
    InvalidPrice(i64),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
