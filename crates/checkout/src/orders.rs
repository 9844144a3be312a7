//! Order store and lifecycle service: checkout, transitions, cancellation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{Order, OrderLine, OrderStatus};
use ledger::{StockLedger, StockLine};
use tokio::sync::RwLock;

use crate::carts::CartStore;
use crate::error::{CheckoutError, Result};
use crate::services::Directory;

/// Orders keyed by id, each behind its own lock.
///
/// The per-order lock is what makes cancellation atomic: stock restoration
/// and the status flip happen under one write guard, so a concurrent second
/// cancel sees either the old status (and waits) or `Cancelled` (and is
/// rejected before touching stock).
#[derive(Clone, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Arc<RwLock<Order>>>>>,
}

impl OrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly placed order.
    pub async fn insert(&self, order: Order) {
        self.orders
            .write()
            .await
            .insert(order.id(), Arc::new(RwLock::new(order)));
    }

    /// Returns the lockable entry for an order, if it exists.
    pub async fn entry(&self, order_id: &OrderId) -> Option<Arc<RwLock<Order>>> {
        self.orders.read().await.get(order_id).cloned()
    }

    /// Returns a point-in-time copy of one order.
    pub async fn get(&self, order_id: &OrderId) -> Option<Order> {
        let entry = self.entry(order_id).await?;
        let order = entry.read().await;
        Some(order.clone())
    }

    /// Returns copies of all orders matching `keep`, newest first.
    pub async fn filtered<F>(&self, keep: F) -> Vec<Order>
    where
        F: Fn(&Order) -> bool,
    {
        let entries: Vec<Arc<RwLock<Order>>> =
            self.orders.read().await.values().cloned().collect();

        let mut orders = Vec::with_capacity(entries.len());
        for entry in entries {
            let order = entry.read().await;
            if keep(&order) {
                orders.push(order.clone());
            }
        }

        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        orders
    }
}

/// Service driving the order lifecycle.
///
/// Checkout is the widest-scoped operation in the system: it holds the
/// user's cart lock across reservation, order materialization, and cart
/// drain, so no caller ever observes stock decremented without an order or
/// an order without a drained cart.
pub struct OrderService<D> {
    ledger: StockLedger,
    directory: D,
    carts: CartStore,
    orders: OrderStore,
}

impl<D: Directory> OrderService<D> {
    /// Creates a new order service over the given collaborators.
    pub fn new(ledger: StockLedger, directory: D, carts: CartStore, orders: OrderStore) -> Self {
        Self {
            ledger,
            directory,
            carts,
            orders,
        }
    }

    /// Converts the user's cart into a pending order.
    ///
    /// Every cart line is reserved against the ledger as one atomic unit:
    /// a line that cannot be covered rolls back the lines reserved before it
    /// and fails the checkout naming the offending product. On success the
    /// order records the cart's price snapshots (not fresh catalog prices)
    /// and the cart is drained.
    #[tracing::instrument(skip(self, shipping_address))]
    pub async fn checkout(&self, user_id: UserId, shipping_address: String) -> Result<Order> {
        metrics::counter!("checkout_total").increment(1);
        let started = Instant::now();

        if !self.directory.user_exists(&user_id).await {
            metrics::counter!("checkout_failed_total").increment(1);
            return Err(CheckoutError::UserNotFound(user_id));
        }

        let Some(handle) = self.carts.existing(&user_id).await else {
            metrics::counter!("checkout_failed_total").increment(1);
            return Err(CheckoutError::EmptyCart(user_id));
        };

        // The cart lock spans reservation, materialization, and drain; a
        // double-submitted checkout serializes here and the loser sees an
        // empty cart.
        let mut cart = handle.lock().await;
        if cart.is_empty() {
            metrics::counter!("checkout_failed_total").increment(1);
            return Err(CheckoutError::EmptyCart(user_id));
        }

        let requests: Vec<StockLine> = cart
            .lines()
            .iter()
            .map(|l| StockLine::new(l.product_id.clone(), l.quantity))
            .collect();

        if let Err(err) = self.ledger.reserve_all(&requests).await {
            metrics::counter!("checkout_failed_total").increment(1);
            return Err(err.into());
        }

        let lines: Vec<OrderLine> = cart
            .lines()
            .iter()
            .map(|l| OrderLine::new(l.product_id.clone(), l.quantity, l.unit_price))
            .collect();
        let order = Order::place(OrderId::new(), user_id, lines, shipping_address);

        self.orders.insert(order.clone()).await;
        cart.clear();

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "checkout completed");

        Ok(order)
    }

    /// Applies a status transition through the lifecycle table.
    ///
    /// A target of `Cancelled` is routed through [`cancel`](Self::cancel) so
    /// stock restoration can never be skipped.
    #[tracing::instrument(skip(self))]
    pub async fn advance(&self, order_id: OrderId, target: OrderStatus) -> Result<Order> {
        if target == OrderStatus::Cancelled {
            return self.cancel(order_id).await;
        }

        let entry = self
            .orders
            .entry(&order_id)
            .await
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        let mut order = entry.write().await;
        order.advance(target)?;
        tracing::info!(%order_id, status = %order.status(), "order status advanced");
        Ok(order.clone())
    }

    /// Marks a pending order as confirmed.
    pub async fn confirm(&self, order_id: OrderId) -> Result<Order> {
        self.advance(order_id, OrderStatus::Confirmed).await
    }

    /// Marks a confirmed order as shipped.
    pub async fn ship(&self, order_id: OrderId) -> Result<Order> {
        self.advance(order_id, OrderStatus::Shipped).await
    }

    /// Marks a shipped order as delivered.
    pub async fn deliver(&self, order_id: OrderId) -> Result<Order> {
        self.advance(order_id, OrderStatus::Delivered).await
    }

    /// Cancels a pending or confirmed order, restoring every line's quantity
    /// to the ledger.
    ///
    /// The transition is checked before any stock moves, so cancelling an
    /// already-cancelled (or shipped) order fails without crediting a unit;
    /// restoration happens exactly once per order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let entry = self
            .orders
            .entry(&order_id)
            .await
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        let mut order = entry.write().await;
        order.status().transition(OrderStatus::Cancelled)?;

        let restores: Vec<StockLine> = order
            .lines()
            .iter()
            .map(|l| StockLine::new(l.product_id.clone(), l.quantity))
            .collect();
        self.ledger.restore_all(&restores).await?;

        order.advance(OrderStatus::Cancelled)?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled, stock restored");
        Ok(order.clone())
    }

    /// Returns one order by id.
    pub async fn order(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get(&order_id)
            .await
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    /// Returns all orders, newest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.filtered(|_| true).await
    }

    /// Returns a user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        if !self.directory.user_exists(&user_id).await {
            return Err(CheckoutError::UserNotFound(user_id));
        }
        Ok(self.orders.filtered(|o| o.user_id() == user_id).await)
    }

    /// Returns all orders in a given status, newest first.
    pub async fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders.filtered(|o| o.status() == status).await
    }

    /// Returns orders created at or after `cutoff`, newest first.
    pub async fn orders_since(&self, cutoff: DateTime<Utc>) -> Vec<Order> {
        self.orders.filtered(|o| o.created_at() >= cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carts::CartService;
    use crate::services::InMemoryDirectory;
    use common::{Money, ProductId};
    use ledger::Product;

    struct Fixture {
        ledger: StockLedger,
        directory: InMemoryDirectory,
        carts: CartService<StockLedger, InMemoryDirectory>,
        orders: OrderService<InMemoryDirectory>,
    }

    async fn setup() -> Fixture {
        let ledger = StockLedger::new();
        let directory = InMemoryDirectory::new();
        let cart_store = CartStore::new();
        let order_store = OrderStore::new();

        let carts = CartService::new(ledger.clone(), directory.clone(), cart_store.clone());
        let orders = OrderService::new(
            ledger.clone(),
            directory.clone(),
            cart_store,
            order_store,
        );

        Fixture {
            ledger,
            directory,
            carts,
            orders,
        }
    }

    async fn seed_product(fixture: &Fixture, id: &str, price_cents: i64, stock: i64) {
        fixture
            .ledger
            .upsert_product(Product::new(id, "Widget", Money::from_cents(price_cents), stock))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn checkout_without_cart_is_empty_cart() {
        let fixture = setup().await;
        let user_id = fixture.directory.register(UserId::new()).await;

        let result = fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart(_))));
    }

    #[tokio::test]
    async fn checkout_unknown_user_fails() {
        let fixture = setup().await;

        let result = fixture
            .orders
            .checkout(UserId::new(), "123 Main St".to_string())
            .await;
        assert!(matches!(result, Err(CheckoutError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn checkout_reserves_stock_and_drains_cart() {
        let fixture = setup().await;
        seed_product(&fixture, "SKU-001", 1000, 3).await;
        let user_id = fixture.directory.register(UserId::new()).await;

        fixture
            .carts
            .add_line(user_id, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();

        let order = fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount().cents(), 3000);
        assert_eq!(
            fixture
                .ledger
                .stock_of(&ProductId::new("SKU-001"))
                .await
                .unwrap(),
            0
        );
        assert!(fixture.carts.snapshot(user_id).await.is_empty());
    }

    #[tokio::test]
    async fn double_submit_loses_to_drained_cart() {
        let fixture = setup().await;
        seed_product(&fixture, "SKU-001", 1000, 3).await;
        let user_id = fixture.directory.register(UserId::new()).await;

        fixture
            .carts
            .add_line(user_id, ProductId::new("SKU-001"), 1)
            .await
            .unwrap();

        fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await
            .unwrap();
        let second = fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await;

        assert!(matches!(second, Err(CheckoutError::EmptyCart(_))));
    }

    #[tokio::test]
    async fn cancel_restores_stock_once() {
        let fixture = setup().await;
        seed_product(&fixture, "SKU-001", 1000, 3).await;
        let user_id = fixture.directory.register(UserId::new()).await;

        fixture
            .carts
            .add_line(user_id, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();
        let order = fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await
            .unwrap();

        fixture.orders.cancel(order.id()).await.unwrap();
        assert_eq!(
            fixture
                .ledger
                .stock_of(&ProductId::new("SKU-001"))
                .await
                .unwrap(),
            3
        );

        // A second cancel is rejected and must not double-credit
        let second = fixture.orders.cancel(order.id()).await;
        assert!(matches!(
            second,
            Err(CheckoutError::Order(domain::OrderError::InvalidTransition { .. }))
        ));
        assert_eq!(
            fixture
                .ledger
                .stock_of(&ProductId::new("SKU-001"))
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn advance_routes_cancellation_through_restore() {
        let fixture = setup().await;
        seed_product(&fixture, "SKU-001", 1000, 2).await;
        let user_id = fixture.directory.register(UserId::new()).await;

        fixture
            .carts
            .add_line(user_id, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();
        let order = fixture
            .orders
            .checkout(user_id, "123 Main St".to_string())
            .await
            .unwrap();

        fixture
            .orders
            .advance(order.id(), OrderStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(
            fixture
                .ledger
                .stock_of(&ProductId::new("SKU-001"))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn queries_filter_and_sort() {
        let fixture = setup().await;
        seed_product(&fixture, "SKU-001", 1000, 10).await;
        let user_a = fixture.directory.register(UserId::new()).await;
        let user_b = fixture.directory.register(UserId::new()).await;

        for user in [user_a, user_b] {
            fixture
                .carts
                .add_line(user, ProductId::new("SKU-001"), 1)
                .await
                .unwrap();
            fixture
                .orders
                .checkout(user, "123 Main St".to_string())
                .await
                .unwrap();
        }

        assert_eq!(fixture.orders.orders().await.len(), 2);
        assert_eq!(fixture.orders.orders_for_user(user_a).await.unwrap().len(), 1);
        assert_eq!(
            fixture
                .orders
                .orders_since(Utc::now() - chrono::Duration::days(30))
                .await
                .len(),
            2
        );
        assert!(
            fixture
                .orders
                .orders_since(Utc::now() + chrono::Duration::days(1))
                .await
                .is_empty()
        );
        assert_eq!(
            fixture
                .orders
                .orders_by_status(OrderStatus::Pending)
                .await
                .len(),
            2
        );
        assert!(
            fixture
                .orders
                .orders_for_user(UserId::new())
                .await
                .is_err()
        );
    }
}
