//! The stock ledger: authoritative per-product counters.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use common::{Money, ProductId};
use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::error::{LedgerError, Result};
use crate::product::{Product, StockLine};

/// One registered product. The stock counter is atomic so reservations can
/// run as a single compare-and-decrement without taking the map lock in
/// write mode.
struct Entry {
    name: String,
    price: Money,
    active: AtomicBool,
    stock: AtomicI64,
}

impl Entry {
    /// Compare-and-decrement. Returns the remaining stock, or the observed
    /// (insufficient) stock as the error value.
    fn try_reserve(&self, quantity: u32) -> std::result::Result<i64, i64> {
        let qty = i64::from(quantity);
        self.stock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current >= qty).then_some(current - qty)
            })
            .map(|previous| previous - qty)
    }

    /// Adds units back. Returns the new stock level.
    fn credit(&self, quantity: u32) -> i64 {
        let qty = i64::from(quantity);
        self.stock.fetch_add(qty, Ordering::SeqCst) + qty
    }
}

/// In-memory product store and stock ledger.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone, Default)]
pub struct StockLedger {
    products: Arc<RwLock<HashMap<ProductId, Arc<Entry>>>>,
}

impl StockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product or replaces an existing registration.
    ///
    /// The record's stock becomes the absolute level. Price must be
    /// positive and stock non-negative.
    pub async fn upsert_product(&self, product: Product) -> Result<()> {
        if !product.price.is_positive() {
            return Err(LedgerError::InvalidPrice(product.price.cents()));
        }
        if product.stock < 0 {
            return Err(LedgerError::InvalidStockLevel(product.stock));
        }

        tracing::debug!(product_id = %product.id, stock = product.stock, "product upserted");

        let entry = Arc::new(Entry {
            name: product.name,
            price: product.price,
            active: AtomicBool::new(product.active),
            stock: AtomicI64::new(product.stock),
        });
        self.products.write().await.insert(product.id, entry);
        Ok(())
    }

    /// Marks a product as no longer sellable. Its stock counter stays live
    /// so cancellations can still restore against it.
    pub async fn deactivate(&self, product_id: &ProductId) -> Result<()> {
        let entry = self.entry(product_id).await?;
        entry.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Atomically removes `quantity` units from stock.
    ///
    /// Returns the remaining stock. Fails without any change if the product
    /// is unknown or fewer than `quantity` units are on hand; no interleaving
    /// of two reservations can oversell the counter.
    pub async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<i64> {
        let entry = self.entry(product_id).await?;
        entry
            .try_reserve(quantity)
            .map_err(|available| LedgerError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available,
            })
    }

    /// Atomically adds `quantity` units back to stock. Returns the new level.
    pub async fn restore(&self, product_id: &ProductId, quantity: u32) -> Result<i64> {
        let entry = self.entry(product_id).await?;
        Ok(entry.credit(quantity))
    }

    /// Reserves every line or none.
    ///
    /// Lines are reserved in order; on the first failure every reservation
    /// already made in this call is credited back before the error is
    /// returned, so a failed call leaves all counters exactly as they were.
    pub async fn reserve_all(&self, lines: &[StockLine]) -> Result<()> {
        let mut reserved: Vec<(Arc<Entry>, u32)> = Vec::with_capacity(lines.len());

        for line in lines {
            let entry = match self.entry(&line.product_id).await {
                Ok(entry) => entry,
                Err(err) => {
                    Self::roll_back(&reserved);
                    return Err(err);
                }
            };

            match entry.try_reserve(line.quantity) {
                Ok(_) => reserved.push((entry, line.quantity)),
                Err(available) => {
                    Self::roll_back(&reserved);
                    return Err(LedgerError::InsufficientStock {
                        product_id: line.product_id.clone(),
                        requested: line.quantity,
                        available,
                    });
                }
            }
        }

        Ok(())
    }

    /// Restores every line.
    ///
    /// All products are resolved before any counter is touched, so an
    /// unknown product fails the whole call without a partial credit.
    pub async fn restore_all(&self, lines: &[StockLine]) -> Result<()> {
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            entries.push((self.entry(&line.product_id).await?, line.quantity));
        }

        for (entry, quantity) in entries {
            entry.credit(quantity);
        }
        Ok(())
    }

    /// Administrative absolute stock set. Returns the new level.
    pub async fn set_stock(&self, product_id: &ProductId, level: i64) -> Result<i64> {
        if level < 0 {
            return Err(LedgerError::InvalidStockLevel(level));
        }

        let entry = self.entry(product_id).await?;
        entry.stock.store(level, Ordering::SeqCst);
        tracing::debug!(%product_id, level, "stock level set");
        Ok(level)
    }

    /// Current stock level for one product.
    pub async fn stock_of(&self, product_id: &ProductId) -> Result<i64> {
        let entry = self.entry(product_id).await?;
        Ok(entry.stock.load(Ordering::SeqCst))
    }

    fn roll_back(reserved: &[(Arc<Entry>, u32)]) {
        for (entry, quantity) in reserved {
            entry.credit(*quantity);
        }
    }

    async fn entry(&self, product_id: &ProductId) -> Result<Arc<Entry>> {
        self.products
            .read()
            .await
            .get(product_id)
            .cloned()
            .ok_or_else(|| LedgerError::ProductNotFound(product_id.clone()))
    }
}

#[async_trait]
impl Catalog for StockLedger {
    async fn product(&self, id: &ProductId) -> Result<Product> {
        let entry = self.entry(id).await?;
        Ok(Product {
            id: id.clone(),
            name: entry.name.clone(),
            price: entry.price,
            stock: entry.stock.load(Ordering::SeqCst),
            active: entry.active.load(Ordering::SeqCst),
        })
    }
}
