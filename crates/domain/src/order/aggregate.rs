//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderStatus};

/// One product entry in an order.
///
/// Copied from the cart at checkout and immutable afterwards; it is a
/// historical record, unaffected by later catalog price or stock changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Units ordered.
    pub quantity: u32,

    /// Price per unit as snapshotted by the cart line.
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the line total (quantity * unit_price).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// Created exactly once per successful checkout with status
/// [`OrderStatus::Pending`]. Lines and `total_amount` are fixed at creation;
/// the only mutation ever applied is a status transition. Orders are never
/// deleted; cancellation is a status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    lines: Vec<OrderLine>,
    total_amount: Money,
    status: OrderStatus,
    shipping_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Materializes a pending order from checked-out cart lines.
    ///
    /// `total_amount` is computed here, once, from the given lines and is
    /// never recomputed.
    pub fn place(
        id: OrderId,
        user_id: UserId,
        lines: Vec<OrderLine>,
        shipping_address: impl Into<String>,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::subtotal).sum();
        let now = Utc::now();

        Self {
            id,
            user_id,
            lines,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address: shipping_address.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns all lines in cart order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns the total amount fixed at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the shipping address recorded at checkout.
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last status-change time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a status transition through the lifecycle table.
    pub fn advance(&mut self, target: OrderStatus) -> Result<(), OrderError> {
        self.status = self.status.transition(target)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
