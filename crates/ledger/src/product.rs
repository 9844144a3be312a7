//! Product records as seen through the catalog.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A point-in-time view of one product in the store.
///
/// `stock` is read from the same counter the ledger mutates, so a snapshot is
/// accurate at the moment it is taken but may be stale by the time it is
/// acted on. Callers that need a guarantee reserve through the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier (SKU).
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Unit price in cents.
    pub price: Money,

    /// Units on hand.
    pub stock: i64,

    /// Whether the product can currently be sold.
    pub active: bool,
}

impl Product {
    /// Creates an active product record.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            active: true,
        }
    }
}

/// One product/quantity pair in a multi-line reserve or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    /// The product whose stock is affected.
    pub product_id: ProductId,

    /// Number of units.
    pub quantity: u32,
}

impl StockLine {
    /// Creates a stock line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}
