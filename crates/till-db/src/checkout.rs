//! # Checkout Transactions
//!
//! The two multi-table writes at the heart of the till: sale finalization
//! and return processing. Each runs inside a single SQLite transaction and
//! either fully commits or leaves no trace.
//!
//! Stock is the contended resource. The cart's add-time check is advisory
//! only; the authoritative check happens here, as a guarded decrement
//! (`UPDATE ... SET quantity = quantity - ? WHERE id = ? AND quantity >= ?`)
//! executed at commit time. Zero rows affected means another station sold
//! the stock first, and the whole transaction rolls back. Two carts racing
//! for the last unit therefore resolve to exactly one committed sale.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use till_core::{
    loyalty_points_earned, Cart, CoreError, Customer, Money, PaymentMethod, PosEvent, Sale,
    SaleItem, ValidationError,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::outbox;

/// Errors from checkout transactions: either a business rule refused the
/// operation or the store itself failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Store(err.into())
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// A finalized cart ready to commit, with the customer already resolved.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub customer: Customer,
    pub cart: Cart,
    pub payment_method: PaymentMethod,
}

/// Outcome of a committed sale.
#[derive(Debug, Clone)]
pub struct CommittedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub points_earned: i64,
    /// Post-commit stock per product touched, in cart line order
    /// (deduplicated when the cart had repeat lines).
    pub stock_levels: Vec<(String, i64)>,
}

/// One line of a return request, keyed by the committed sale item. Keying
/// by item rather than product keeps the refund priced at that exact
/// line's frozen unit price even when a product appears on several lines.
#[derive(Debug, Clone)]
pub struct ReturnLine {
    pub sale_item_id: String,
    pub quantity: i64,
}

/// Outcome of a processed return.
#[derive(Debug, Clone)]
pub struct ProcessedReturn {
    pub sale_id: String,
    pub refund: Money,
    /// Sale total after the refund was deducted.
    pub new_total: Money,
    /// Post-return stock per product restocked.
    pub stock_levels: Vec<(String, i64)>,
}

/// Owner of the checkout transaction boundaries.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    /// Commits a sale atomically: sale row, one item row per cart line,
    /// guarded stock decrements, loyalty credit, and outbox notifications.
    ///
    /// On any failure nothing is written; the caller keeps the cart intact
    /// and can retry after adjusting it.
    pub async fn finalize(&self, draft: SaleDraft) -> CheckoutResult<CommittedSale> {
        if draft.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let total = draft.cart.total();
        let points = loyalty_points_earned(total);

        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        sqlx::query(
            "INSERT INTO sales (id, customer_id, total_cents, discount_bps, payment_method, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale_id)
        .bind(&draft.customer.id)
        .bind(total.cents())
        .bind(draft.cart.discount().bps())
        .bind(draft.payment_method.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from)?;

        for line in draft.cart.lines() {
            sqlx::query(
                "INSERT INTO sale_items \
                 (id, sale_id, product_id, name_snapshot, quantity, unit_price_cents, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale_id)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            // Commit-time re-validation. The add-time check was advisory;
            // this decrement is the authority on available stock.
            let decremented = sqlx::query(
                "UPDATE products SET quantity = quantity - ?, updated_at = ? \
                 WHERE id = ? AND quantity >= ?",
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            if decremented.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(StoreError::from)?
                        .unwrap_or(0);

                tx.rollback().await.map_err(StoreError::from)?;
                warn!(
                    sale_id = %sale_id,
                    product = %line.name,
                    requested = line.quantity,
                    available,
                    "finalize aborted: insufficient stock at commit"
                );
                return Err(CoreError::InsufficientStock {
                    name: line.name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        sqlx::query("UPDATE customers SET loyalty_points = loyalty_points + ? WHERE id = ?")
            .bind(points)
            .bind(&draft.customer.id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

        // Notifications ride the transaction: they exist iff the sale does.
        let mut stock_levels: Vec<(String, i64)> = Vec::new();
        for line in draft.cart.lines() {
            if stock_levels.iter().any(|(id, _)| id == &line.product_id) {
                continue;
            }
            let new_quantity: i64 =
                sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
                    .bind(&line.product_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(StoreError::from)?;
            outbox::insert_event(
                &mut *tx,
                &PosEvent::InventoryUpdated {
                    product_id: line.product_id.clone(),
                    new_quantity,
                },
            )
            .await?;
            stock_levels.push((line.product_id.clone(), new_quantity));
        }

        outbox::insert_event(
            &mut *tx,
            &PosEvent::NewSale {
                sale_id: sale_id.clone(),
                customer: draft.customer.name.clone(),
                total_cents: total.cents(),
                date: now,
            },
        )
        .await?;

        tx.commit().await.map_err(StoreError::from)?;

        info!(
            sale_id = %sale_id,
            customer = %draft.customer.name,
            total_cents = total.cents(),
            points_earned = points,
            "sale committed"
        );

        let sale = Sale {
            id: sale_id.clone(),
            customer_id: draft.customer.id.clone(),
            total_cents: total.cents(),
            discount_bps: draft.cart.discount().bps(),
            payment_method: draft.payment_method,
            created_at: now,
        };

        let items = crate::repository::sale::SaleRepository::new(self.pool.clone())
            .items(&sale_id)
            .await?;

        Ok(CommittedSale {
            sale,
            items,
            points_earned: points,
            stock_levels,
        })
    }

    /// Processes a return against a committed sale atomically: restocks
    /// every returned product and deducts the refund from the sale total.
    ///
    /// All lines are validated against the originally sold quantities
    /// before anything is written; one bad line rejects the whole request.
    /// The refund is priced at the frozen per-line unit prices. A refund
    /// that would take the sale total negative fails the transaction on
    /// the schema's total check.
    pub async fn process_return(
        &self,
        sale_id: &str,
        lines: &[ReturnLine],
    ) -> CheckoutResult<ProcessedReturn> {
        let sales = crate::repository::sale::SaleRepository::new(self.pool.clone());
        let sale = sales.get_by_id(sale_id).await?;
        let items = sales.items(sale_id).await?;

        // Validate everything up front: no partial returns. Each line is
        // checked against the item's original quantity, not what remains
        // after earlier returns. Zero-quantity lines are valid no-ops, so
        // callers can submit every line of the sale and zero the untouched
        // ones.
        let mut refund = Money::zero();
        let mut restocks: Vec<(&SaleItem, i64)> = Vec::new();
        for line in lines {
            if line.quantity < 0 {
                return Err(CoreError::Validation(ValidationError::Negative {
                    field: "return quantity".to_string(),
                })
                .into());
            }
            if line.quantity == 0 {
                continue;
            }

            let Some(item) = items.iter().find(|i| i.id == line.sale_item_id) else {
                return Err(StoreError::not_found("sale item", &line.sale_item_id).into());
            };
            if line.quantity > item.quantity {
                return Err(CoreError::ReturnExceedsSold {
                    name: item.name_snapshot.clone(),
                    sold: item.quantity,
                    requested: line.quantity,
                }
                .into());
            }

            refund += item.unit_price().multiply_quantity(line.quantity);
            restocks.push((item, line.quantity));
        }

        // Every line was a zero no-op: nothing to write.
        if restocks.is_empty() {
            return Ok(ProcessedReturn {
                sale_id: sale_id.to_string(),
                refund: Money::zero(),
                new_total: sale.total(),
                stock_levels: Vec::new(),
            });
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        // The schema's CHECK (total_cents >= 0) rejects over-refunds here.
        sqlx::query("UPDATE sales SET total_cents = total_cents - ? WHERE id = ?")
            .bind(refund.cents())
            .bind(sale_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

        for (item, quantity) in &restocks {
            sqlx::query(
                "UPDATE products SET quantity = quantity + ?, updated_at = ? WHERE id = ?",
            )
            .bind(*quantity)
            .bind(now)
            .bind(&item.product_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;
        }

        // One inventory event per touched product, after all increments.
        let mut stock_levels: Vec<(String, i64)> = Vec::new();
        for (item, _) in &restocks {
            if stock_levels.iter().any(|(id, _)| id == &item.product_id) {
                continue;
            }
            let new_quantity: i64 =
                sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
                    .bind(&item.product_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(StoreError::from)?;
            outbox::insert_event(
                &mut *tx,
                &PosEvent::InventoryUpdated {
                    product_id: item.product_id.clone(),
                    new_quantity,
                },
            )
            .await?;
            stock_levels.push((item.product_id.clone(), new_quantity));
        }

        tx.commit().await.map_err(StoreError::from)?;

        let new_total = Money::from_cents(sale.total_cents) - refund;
        info!(
            sale_id = %sale_id,
            refund_cents = refund.cents(),
            new_total_cents = new_total.cents(),
            "return processed"
        );

        Ok(ProcessedReturn {
            sale_id: sale_id.to_string(),
            refund,
            new_total,
            stock_levels,
        })
    }
}
