//! Purchase order repository.
//!
//! Purchase orders request restocks from suppliers. Creating one reads
//! product stock but never mutates it; stock only moves when a completed
//! delivery is booked through `ProductRepository::adjust_stock`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use till_core::{CoreError, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus, ValidationError};

use crate::checkout::CheckoutResult;
use crate::error::{StoreError, StoreResult};
use crate::repository::outbox;

const PO_COLUMNS: &str = "id, supplier_id, status, created_at";

const PO_ITEM_COLUMNS: &str = "id, po_id, product_id, quantity";

/// A line of a purchase order being created.
#[derive(Debug, Clone)]
pub struct NewPurchaseOrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A purchase order being created.
#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub supplier_id: String,
    pub lines: Vec<NewPurchaseOrderLine>,
}

/// Repository for purchase order operations.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// Creates a pending order with its lines in one transaction and
    /// queues a notification in the outbox. An order with no lines is bad
    /// input, rejected before anything is written.
    pub async fn create(&self, new: NewPurchaseOrder) -> CheckoutResult<PurchaseOrder> {
        if new.lines.is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "purchase order lines".to_string(),
            })
            .into());
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO purchase_orders (id, supplier_id, status, created_at) \
             VALUES (?, ?, 'pending', ?)",
        )
        .bind(&id)
        .bind(&new.supplier_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &new.lines {
            sqlx::query(
                "INSERT INTO purchase_order_items (id, po_id, product_id, quantity) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let event = till_core::PosEvent::PurchaseOrderCreated {
            po_id: id.clone(),
            supplier_id: new.supplier_id.clone(),
        };
        outbox::insert_event(&mut *tx, &event).await?;

        tx.commit().await?;

        info!(po_id = %id, supplier_id = %new.supplier_id, lines = new.lines.len(), "purchase order created");
        Ok(self.get_by_id(&id).await?)
    }

    /// Generates one pending order per supplier covering every low-stock
    /// product that has a supplier. Order quantity restocks to twice the
    /// product's threshold. Products without a supplier are skipped.
    ///
    /// Returns the created orders; empty when nothing is low.
    pub async fn auto_generate(&self) -> CheckoutResult<Vec<PurchaseOrder>> {
        let low: Vec<(String, i64, i64, Option<String>)> = sqlx::query_as(
            "SELECT id, quantity, min_stock, supplier_id FROM products \
             WHERE quantity < min_stock ORDER BY supplier_id, name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_supplier: Vec<(String, Vec<NewPurchaseOrderLine>)> = Vec::new();
        for (product_id, quantity, min_stock, supplier_id) in low {
            let Some(supplier_id) = supplier_id else {
                debug!(product_id = %product_id, "low-stock product has no supplier, skipping");
                continue;
            };
            let order_quantity = (min_stock * 2 - quantity).max(1);
            let line = NewPurchaseOrderLine {
                product_id,
                quantity: order_quantity,
            };
            match by_supplier.iter_mut().find(|(s, _)| *s == supplier_id) {
                Some((_, lines)) => lines.push(line),
                None => by_supplier.push((supplier_id, vec![line])),
            }
        }

        let mut orders = Vec::with_capacity(by_supplier.len());
        for (supplier_id, lines) in by_supplier {
            let order = self.create(NewPurchaseOrder { supplier_id, lines }).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<PurchaseOrder> {
        let query = format!("SELECT {PO_COLUMNS} FROM purchase_orders WHERE id = ?");
        sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("purchase order", id))
    }

    pub async fn items(&self, po_id: &str) -> StoreResult<Vec<PurchaseOrderItem>> {
        let query = format!(
            "SELECT {PO_ITEM_COLUMNS} FROM purchase_order_items WHERE po_id = ? ORDER BY rowid"
        );
        Ok(sqlx::query_as::<_, PurchaseOrderItem>(&query)
            .bind(po_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list(&self) -> StoreResult<Vec<PurchaseOrder>> {
        let query = format!("SELECT {PO_COLUMNS} FROM purchase_orders ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, PurchaseOrder>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn set_status(&self, id: &str, status: PurchaseOrderStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE purchase_orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("purchase order", id));
        }
        Ok(())
    }
}
