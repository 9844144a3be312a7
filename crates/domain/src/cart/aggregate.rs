//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::CartError;

/// One product entry in a cart.
///
/// `unit_price` is the catalog price at the moment the line was first added;
/// later catalog price changes do not reprice the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Units requested. Always strictly positive.
    pub quantity: u32,

    /// Price per unit snapshotted at add-time.
    pub unit_price: Money,
}

impl CartLine {
    /// Creates a new cart line.
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

/// Per-user shopping cart.
///
/// Lines keep insertion order. The cart itself never performs availability
/// checks; the service layer validates against the catalog before mutating.
/// A cart is drained (never deleted) on checkout or clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    lines: Vec<CartLine>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns all lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the quantity already carted for a product (0 if no line).
    pub fn carted_quantity(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    /// Returns the derived cart total.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Returns the last mutation time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Adds `quantity` units of a product.
    ///
    /// An existing line keeps its price snapshot and gains quantity; a new
    /// line is appended with the given price as its snapshot.
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine::new(product_id, quantity, unit_price)),
        }

        self.touch();
        Ok(())
    }

    /// Overwrites the quantity of an existing line. A quantity of zero
    /// removes the line instead.
    pub fn set_line_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.product_id == product_id)
            .ok_or_else(|| CartError::LineNotFound {
                product_id: product_id.clone(),
            })?;

        line.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Removes the line for a product. Fails if the line does not exist so
    /// double-removals surface at the caller instead of passing silently.
    pub fn remove_line(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let position = self
            .lines
            .iter()
            .position(|l| &l.product_id == product_id)
            .ok_or_else(|| CartError::LineNotFound {
                product_id: product_id.clone(),
            })?;

        self.lines.remove(position);
        self.touch();
        Ok(())
    }

    /// Removes all lines. Always succeeds, even on an empty cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
