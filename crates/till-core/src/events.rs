//! # Notification Events
//!
//! Typed events emitted to the notification sink after a transaction has
//! durably committed. Delivery is fire-and-forget: producers never wait for
//! acknowledgment, and a failed broadcast can never roll back a sale.
//!
//! Events that must not be lost (`new_sale`, `inventory_updated`) are
//! written to the event outbox inside the committing transaction and
//! drained afterwards; purely derived alerts (`low_stock_alert`) are
//! published directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PosEvent {
    /// A product's on-hand quantity changed (sale decrement or return
    /// restock).
    InventoryUpdated {
        product_id: String,
        new_quantity: i64,
    },

    /// A sale committed.
    NewSale {
        sale_id: String,
        customer: String,
        total_cents: i64,
        date: DateTime<Utc>,
    },

    /// One or more products fell below their restock threshold.
    LowStockAlert { products: Vec<LowStockProduct> },

    /// A purchase order was created (manually or auto-generated).
    PurchaseOrderCreated {
        po_id: String,
        supplier_id: String,
    },
}

impl PosEvent {
    /// Stable discriminator used as the outbox `event_type` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            PosEvent::InventoryUpdated { .. } => "inventory_updated",
            PosEvent::NewSale { .. } => "new_sale",
            PosEvent::LowStockAlert { .. } => "low_stock_alert",
            PosEvent::PurchaseOrderCreated { .. } => "purchase_order_created",
        }
    }
}

/// One product in a low-stock alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub min_stock: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let event = PosEvent::InventoryUpdated {
            product_id: "p1".to_string(),
            new_quantity: 4,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"inventory_updated\""));

        let back: PosEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn event_type_matches_serde_tag() {
        let event = PosEvent::NewSale {
            sale_id: "s1".to_string(),
            customer: "Ada".to_string(),
            total_cents: 4750,
            date: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(&format!("\"{}\"", event.event_type())));
    }
}
