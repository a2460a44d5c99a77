//! Cart lines and the in-session cart.

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Quantity, QuantityError};

/// One product and how many units of it the customer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a line from an already-validated quantity.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// Create a line from raw input.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] for zero, negative or oversized quantities.
    pub fn try_new(product_id: ProductId, quantity: i64) -> Result<Self, QuantityError> {
        Ok(Self::new(product_id, Quantity::new(quantity)?))
    }
}

/// A customer's cart, at most one line per product, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add units of a product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: Quantity) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine::new(product_id, quantity));
        }
    }

    /// Set a product's quantity from raw input. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooLarge`] if the quantity exceeds
    /// [`Quantity::MAX`]; the cart is left unchanged.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<(), QuantityError> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }

        let quantity = Quantity::new(quantity)?;
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine::new(product_id, quantity));
        }
        Ok(())
    }

    /// Remove a product's line. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines (the header badge count).
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut cart = Self::new();
        for line in iter {
            cart.add(line.product_id, line.quantity);
        }
        cart
    }
}
