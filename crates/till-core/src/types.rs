//! # Domain Types
//!
//! Row-shaped domain types shared by the storage layer and the engine.
//!
//! Every entity uses a UUID v4 string `id` (globally unique without
//! coordination, which matters for multi-station stores) and stores money as
//! integer cents and percentages as basis points. Monetary helpers return
//! [`Money`] wrappers; the raw `_cents` fields exist so the rows map straight
//! onto the SQLite schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Percent};

// =============================================================================
// Product
// =============================================================================

/// A sellable stock-keeping unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique: sale operations resolve products by name.
    pub name: String,

    /// Category label ("Beverages", "Snacks", ...).
    pub category: String,

    /// On-hand quantity. Never negative; the schema enforces it too.
    pub quantity: i64,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Per-product discount in basis points, applied when a line is added
    /// to a cart (0 = no discount).
    pub discount_bps: u32,

    /// Restock threshold: quantity < min_stock triggers the low-stock alert.
    pub min_stock: i64,

    /// Preferred supplier, if any.
    pub supplier_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Per-product discount.
    #[inline]
    pub fn discount(&self) -> Percent {
        Percent::from_bps(self.discount_bps)
    }

    /// Unit price after the per-product discount. This is the price a cart
    /// line freezes at add time.
    pub fn discounted_price(&self) -> Money {
        self.price().apply_discount(self.discount())
    }

    /// Low-stock condition: on-hand quantity strictly below the threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A buyer accruing loyalty points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,

    /// Unique: finalize resolves customers by name.
    pub name: String,

    pub phone: Option<String>,
    pub email: Option<String>,

    /// Integer point balance, credited at 1 point per $10 of sale total.
    pub loyalty_points: i64,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// The fixed set of accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    MobilePayment,
    Online,
}

impl PaymentMethod {
    /// Canonical lowercase names, matching the database encoding.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::MobilePayment,
        PaymentMethod::Online,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::MobilePayment => "mobile_payment",
            PaymentMethod::Online => "online",
        }
    }

    /// Parses an operator-supplied method name. Accepts a few common
    /// spellings per method; returns None for anything outside the set.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "credit_card" | "card" | "credit" => Some(PaymentMethod::CreditCard),
            "mobile_payment" | "mobile" => Some(PaymentMethod::MobilePayment),
            "online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale / SaleItem
// =============================================================================

/// A finalized sale transaction.
///
/// Created exactly once, at commit, by the checkout transaction. Mutated
/// afterwards only by return processing (total reduced); never by the
/// cart-building flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub customer_id: String,

    /// Grand total in cents: subtotal × (1 − discount), never negative.
    pub total_cents: i64,

    /// Cart-level discount applied at finalize, in basis points.
    pub discount_bps: u32,

    pub payment_method: PaymentMethod,

    /// Commit timestamp; doubles as the sale date.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn discount(&self) -> Percent {
        Percent::from_bps(self.discount_bps)
    }
}

/// A persisted line of a committed sale.
///
/// Name and unit price are snapshots frozen when the line was added to the
/// cart, so history stays stable when the catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name_snapshot: String,

    /// Quantity sold. Always > 0.
    pub quantity: i64,

    /// Unit price in cents at time of add, post per-product discount (frozen).
    pub unit_price_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
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
// Supplier
// =============================================================================

/// A supplier referenced by products and purchase orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// Lifecycle state of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Completed => "completed",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A restock order against a supplier. Reads product stock when built;
/// never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line of a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseOrderItem {
    pub id: String,
    pub po_id: String,
    pub product_id: String,

    /// Units requested from the supplier. Always > 0.
    pub quantity: i64,
}

// =============================================================================
// Expense
// =============================================================================

/// An operating expense record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub amount_cents: i64,
    pub description: Option<String>,

    /// When the expense was incurred (operator-supplied, defaults to now).
    pub spent_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Event Outbox
// =============================================================================

/// A notification queued inside a committing transaction and broadcast
/// after it has durably succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OutboxEvent {
    pub id: String,

    /// Event discriminator: "new_sale", "inventory_updated", ...
    pub event_type: String,

    /// Full event as JSON.
    pub payload: String,

    pub created_at: DateTime<Utc>,

    /// Set once the event has been broadcast. NULL = pending.
    pub published_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Receipt Data
// =============================================================================

/// Everything an external receipt/report generator needs for one committed
/// sale. Formatting and layout are the generator's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptData {
    pub sale_id: String,
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub total_cents: i64,
    pub discount_bps: u32,
    pub payment_method: PaymentMethod,

    /// Lines in original cart insertion order.
    pub lines: Vec<ReceiptLine>,
}

/// One line of receipt data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
