//! # till-core: Pure Business Logic for Tillpos
//!
//! This crate is the heart of the Tillpos sale transaction engine. It holds
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     till-engine                               │
//! │   SaleSession: add_line / set_cart_discount / finalize /      │
//! │   process_return, event bus, outbox drain                     │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │               ★ till-core (THIS CRATE) ★                      │
//! │                                                               │
//! │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐      │
//! │   │  types  │  │  money  │  │  cart   │  │ validation │      │
//! │   │ Product │  │  Money  │  │  Cart   │  │   parsing  │      │
//! │   │  Sale   │  │ Percent │  │CartLine │  │   checks   │      │
//! │   └─────────┘  └─────────┘  └─────────┘  └────────────┘      │
//! │                                                               │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │                  till-db (Database Layer)                     │
//! │         SQLite queries, migrations, repositories              │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output, no side effects
//! 2. **Integer money**: all monetary values are cents (i64), never floats
//! 3. **Basis-point percentages**: discounts are u32 bps (1000 = 10%)
//! 4. **Explicit errors**: typed error enums, never strings or panics

pub mod cart;
pub mod error;
pub mod events;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::{LowStockProduct, PosEvent};
pub use money::{Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// One loyalty point is earned per this many cents of a sale's total,
/// floored. 1000 cents = $10 per point.
pub const CENTS_PER_LOYALTY_POINT: i64 = 1000;

/// Loyalty points earned for a committed sale total: `floor(total / $10)`.
///
/// ## Example
/// ```rust
/// use till_core::{loyalty_points_earned, Money};
///
/// assert_eq!(loyalty_points_earned(Money::from_cents(4750)), 4); // $47.50
/// assert_eq!(loyalty_points_earned(Money::from_cents(999)), 0);  // $9.99
/// ```
pub fn loyalty_points_earned(total: Money) -> i64 {
    if total.cents() <= 0 {
        return 0;
    }
    total.cents() / CENTS_PER_LOYALTY_POINT
}
