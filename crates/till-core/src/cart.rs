//! # Cart Module
//!
//! The mutable, uncommitted state of an in-progress sale: an ordered list of
//! lines plus one cart-level discount.
//!
//! ## Invariants
//! - Lines keep insertion order; that order is the display and receipt order.
//! - The same product may appear as several separate lines; lines are never
//!   merged.
//! - A line's unit price is frozen when it is added (already net of the
//!   per-product discount) and is not re-read at commit.
//! - The stock check here is advisory only: it compares against the product
//!   row as last read. The authoritative check happens inside the checkout
//!   transaction, where concurrent stations are serialized.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percent};
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A pending, uncommitted sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,

    /// Product name at add time (frozen).
    pub name: String,

    /// Units requested. Always > 0.
    pub quantity: i64,

    /// Unit price in cents at add time, post per-product discount (frozen).
    pub unit_price_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The uncommitted working state of one sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: Percent,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount: Percent::zero(),
        }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Current cart-level discount.
    pub fn discount(&self) -> Percent {
        self.discount
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Appends a line for `quantity` units of `product`.
    ///
    /// The requested quantity is checked against the product row the caller
    /// just read (advisory; see module docs). The frozen line price is the
    /// product price net of its per-product discount.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        if quantity > product.quantity {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price_cents: product.discounted_price().cents(),
        });

        Ok(())
    }

    /// Replaces the cart-level discount. Range checking happens at the
    /// parsing boundary; this accepts any already-validated Percent.
    pub fn set_discount(&mut self, discount: Percent) {
        self.discount = discount;
    }

    /// Subtotal: Σ(line.quantity × line.price), before the cart discount.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// Grand total: subtotal × (1 − discount/100).
    pub fn total(&self) -> Money {
        self.subtotal().apply_discount(self.discount)
    }

    /// Discards all lines and resets the discount to zero.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = Percent::zero();
    }

    /// Snapshot of the running totals.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            subtotal_cents: self.subtotal().cents(),
            discount_bps: self.discount.bps(),
            total_cents: self.total().cents(),
        }
    }
}

/// Cart totals summary, recomputed after every cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub discount_bps: u32,
    pub total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
