//! Read-side contract over the product store.

use async_trait::async_trait;
use common::ProductId;

use crate::error::Result;
use crate::product::Product;

/// Read access to product price, stock, and active flag.
///
/// Implementations must serve stock from the same counter the ledger
/// mutates; the catalog is a view over the store, not an independent copy.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up one product. Fails with [`LedgerError::ProductNotFound`]
    /// if the product was never registered.
    ///
    /// [`LedgerError::ProductNotFound`]: crate::LedgerError::ProductNotFound
    async fn product(&self, id: &ProductId) -> Result<Product>;
}
