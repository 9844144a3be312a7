//! Per-user cart store and cart mutation service.

use std::collections::HashMap;
use std::sync::Arc;

use common::{ProductId, UserId};
use domain::{Cart, CartError};
use ledger::{Catalog, Product};
use tokio::sync::{Mutex, RwLock};

use crate::services::Directory;

/// Lazily-created per-user cart handles.
///
/// Each cart sits behind its own async mutex: mutations for one user are
/// serialized, users never contend with each other. A handle is created on
/// first mutating access and lives for the life of the store; carts are
/// drained, not deleted.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<UserId, Arc<Mutex<Cart>>>>>,
}

impl CartStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's cart handle, creating an empty cart on first use.
    pub async fn handle(&self, user_id: UserId) -> Arc<Mutex<Cart>> {
        if let Some(handle) = self.carts.read().await.get(&user_id) {
            return handle.clone();
        }

        self.carts
            .write()
            .await
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Cart::new(user_id))))
            .clone()
    }

    /// Returns the user's cart handle only if one was already created.
    pub async fn existing(&self, user_id: &UserId) -> Option<Arc<Mutex<Cart>>> {
        self.carts.read().await.get(user_id).cloned()
    }
}

/// Service for mutating and reading per-user carts.
///
/// Availability checks here are advisory: they compare against the catalog's
/// current stock, but nothing is reserved until checkout. Two users can both
/// cart the last unit; the ledger decides the winner at checkout time.
pub struct CartService<C, D> {
    catalog: C,
    directory: D,
    carts: CartStore,
}

impl<C, D> CartService<C, D>
where
    C: Catalog,
    D: Directory,
{
    /// Creates a new cart service over the given collaborators.
    pub fn new(catalog: C, directory: D, carts: CartStore) -> Self {
        Self {
            catalog,
            directory,
            carts,
        }
    }

    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// An existing line gains quantity (availability is re-checked against
    /// the merged total) and keeps its original price snapshot; a new line
    /// snapshots the current catalog price.
    #[tracing::instrument(skip(self))]
    pub async fn add_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        self.ensure_user(user_id).await?;
        let product = self.sellable(&product_id).await?;

        let handle = self.carts.handle(user_id).await;
        let mut cart = handle.lock().await;

        let requested = cart.carted_quantity(&product_id) + quantity;
        if i64::from(requested) > product.stock {
            return Err(CartError::InsufficientStock {
                product_id,
                requested,
                available: product.stock,
            });
        }

        cart.add_line(product_id, quantity, product.price)?;
        Ok(cart.clone())
    }

    /// Overwrites a line's quantity. Zero behaves as removal. The price
    /// snapshot is never touched.
    #[tracing::instrument(skip(self))]
    pub async fn set_line_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return self.remove_line(user_id, product_id).await;
        }
        self.ensure_user(user_id).await?;

        // Quantity changes re-check availability but not the active flag:
        // a line already in the cart may be resized even if the product was
        // deactivated since.
        let product =
            self.catalog
                .product(&product_id)
                .await
                .map_err(|_| CartError::ProductNotFound {
                    product_id: product_id.clone(),
                })?;

        let handle = self.carts.handle(user_id).await;
        let mut cart = handle.lock().await;

        if cart.line(&product_id).is_none() {
            return Err(CartError::LineNotFound { product_id });
        }
        if i64::from(quantity) > product.stock {
            return Err(CartError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock,
            });
        }

        cart.set_line_quantity(&product_id, quantity)?;
        Ok(cart.clone())
    }

    /// Removes a line. Fails with `LineNotFound` if no line exists, so
    /// client double-removals are surfaced rather than swallowed.
    #[tracing::instrument(skip(self))]
    pub async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        self.ensure_user(user_id).await?;

        let handle = self.carts.handle(user_id).await;
        let mut cart = handle.lock().await;
        cart.remove_line(&product_id)?;
        Ok(cart.clone())
    }

    /// Empties the user's cart. Succeeds even if no cart was ever created.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart, CartError> {
        self.ensure_user(user_id).await?;

        match self.carts.existing(&user_id).await {
            Some(handle) => {
                let mut cart = handle.lock().await;
                cart.clear();
                Ok(cart.clone())
            }
            None => Ok(Cart::new(user_id)),
        }
    }

    /// Returns the current cart contents and derived total. Pure read: a
    /// user with no cart yet sees an empty one, and nothing is stored.
    pub async fn snapshot(&self, user_id: UserId) -> Cart {
        match self.carts.existing(&user_id).await {
            Some(handle) => handle.lock().await.clone(),
            None => Cart::new(user_id),
        }
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), CartError> {
        if self.directory.user_exists(&user_id).await {
            Ok(())
        } else {
            Err(CartError::UserNotFound { user_id })
        }
    }

    /// Looks up a product and requires it to be sellable.
    async fn sellable(&self, product_id: &ProductId) -> Result<Product, CartError> {
        let product =
            self.catalog
                .product(product_id)
                .await
                .map_err(|_| CartError::ProductNotFound {
                    product_id: product_id.clone(),
                })?;

        if !product.active {
            return Err(CartError::ProductInactive {
                product_id: product_id.clone(),
            });
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryDirectory;
    use common::Money;
    use ledger::StockLedger;

    async fn setup() -> (CartService<StockLedger, InMemoryDirectory>, UserId) {
        let ledger = StockLedger::new();
        ledger
            .upsert_product(Product::new("SKU-001", "Widget", Money::from_cents(1000), 5))
            .await
            .unwrap();

        let directory = InMemoryDirectory::new();
        let user_id = directory.register(UserId::new()).await;

        let service = CartService::new(ledger, directory, CartStore::new());
        (service, user_id)
    }

    #[tokio::test]
    async fn add_line_snapshots_price() {
        let (service, user_id) = setup().await;

        let cart = service
            .add_line(user_id, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        let line = cart.line(&ProductId::new("SKU-001")).unwrap();
        assert_eq!(line.unit_price, Money::from_cents(1000));
        assert_eq!(cart.total().cents(), 2000);
    }

    #[tokio::test]
    async fn add_line_unknown_user_fails() {
        let (service, _) = setup().await;

        let result = service
            .add_line(UserId::new(), ProductId::new("SKU-001"), 1)
            .await;
        assert!(matches!(result, Err(CartError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn add_line_unknown_product_fails() {
        let (service, user_id) = setup().await;

        let result = service
            .add_line(user_id, ProductId::new("SKU-404"), 1)
            .await;
        assert!(matches!(result, Err(CartError::ProductNotFound { .. })));
    }

    #[tokio::test]
    async fn add_line_beyond_stock_fails() {
        let (service, user_id) = setup().await;

        let result = service
            .add_line(user_id, ProductId::new("SKU-001"), 6)
            .await;
        assert!(matches!(result, Err(CartError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn merged_add_rechecks_availability() {
        let (service, user_id) = setup().await;

        service
            .add_line(user_id, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();

        // 3 already carted + 3 more exceeds the 5 on hand
        let result = service
            .add_line(user_id, ProductId::new("SKU-001"), 3)
            .await;
        assert!(matches!(
            result,
            Err(CartError::InsufficientStock {
                requested: 6,
                available: 5,
                ..
            })
        ));

        // The original line is untouched
        let cart = service.snapshot(user_id).await;
        assert_eq!(cart.carted_quantity(&ProductId::new("SKU-001")), 3);
    }

    #[tokio::test]
    async fn inactive_product_cannot_be_added() {
        let ledger = StockLedger::new();
        ledger
            .upsert_product(Product::new("SKU-001", "Widget", Money::from_cents(1000), 5))
            .await
            .unwrap();
        ledger.deactivate(&ProductId::new("SKU-001")).await.unwrap();

        let directory = InMemoryDirectory::new();
        let user_id = directory.register(UserId::new()).await;
        let service = CartService::new(ledger, directory, CartStore::new());

        let result = service
            .add_line(user_id, ProductId::new("SKU-001"), 1)
            .await;
        assert!(matches!(result, Err(CartError::ProductInactive { .. })));
    }

    #[tokio::test]
    async fn set_quantity_zero_removes_line() {
        let (service, user_id) = setup().await;

        service
            .add_line(user_id, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();
        let cart = service
            .set_line_quantity(user_id, ProductId::new("SKU-001"), 0)
            .await
            .unwrap();

        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn clear_without_cart_succeeds() {
        let (service, user_id) = setup().await;

        let cart = service.clear(user_id).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn snapshot_for_fresh_user_is_empty_and_not_stored() {
        let (service, user_id) = setup().await;

        let cart = service.snapshot(user_id).await;
        assert!(cart.is_empty());
        assert!(service.carts.existing(&user_id).await.is_none());
    }
}
