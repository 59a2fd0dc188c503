//! # Sale Session
//!
//! One [`SaleSession`] per till station: the in-progress cart, the store
//! handle, and the notification bus. Cart assembly mutates only session
//! state; the database is touched for reads (product lookups) and for the
//! two atomic operations, finalize and return.
//!
//! The cart survives a failed finalize untouched, so the operator can
//! remove the offending line and retry. It is cleared only after a commit
//! has durably succeeded.

use tracing::{info, warn};

use till_core::validation::{parse_payment_method, parse_percent, parse_quantity, validate_name};
use till_core::{Cart, CartTotals, CoreError, LowStockProduct, PosEvent, ReceiptData};
use till_db::{CommittedSale, Database, ProcessedReturn, ReturnLine, SaleDraft, StoreError};

use crate::error::{EngineError, EngineResult};
use crate::events::EventBus;

/// Maps a store miss onto the matching domain error; anything else stays a
/// persistence failure.
fn or_domain(err: StoreError, domain: impl FnOnce(String) -> CoreError) -> EngineError {
    match err {
        StoreError::NotFound { id, .. } => EngineError::Domain(domain(id)),
        other => EngineError::Persistence(other),
    }
}

/// An operator's sale-assembly session.
#[derive(Debug)]
pub struct SaleSession {
    db: Database,
    events: EventBus,
    cart: Cart,
}

impl SaleSession {
    pub fn new(db: Database, events: EventBus) -> Self {
        SaleSession {
            db,
            events,
            cart: Cart::new(),
        }
    }

    /// Read access to the in-progress cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// Adds a line to the cart from raw operator input.
    ///
    /// Resolves the product by name, checks the requested quantity against
    /// the stock just read (advisory), and freezes the discounted unit
    /// price into the line. Returns the updated running totals.
    pub async fn add_line(&mut self, product_name: &str, quantity: &str) -> EngineResult<CartTotals> {
        let name = validate_name("product name", product_name)?;
        let quantity = parse_quantity("quantity", quantity)?;

        let product = self
            .db
            .products()
            .get_by_name(&name)
            .await
            .map_err(|e| or_domain(e, CoreError::ProductNotFound))?;

        self.cart.add_line(&product, quantity)?;
        Ok(self.cart.totals())
    }

    /// Sets the cart-level discount from raw operator input ("10", "12.5").
    /// Invalid input leaves the current discount in place.
    pub fn set_cart_discount(&mut self, percent: &str) -> EngineResult<CartTotals> {
        let discount = parse_percent("discount", percent)?;
        self.cart.set_discount(discount);
        Ok(self.cart.totals())
    }

    /// Abandons the in-progress cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Finalizes the cart as a committed sale.
    ///
    /// Resolves the customer by name, then runs the checkout transaction:
    /// sale + items inserted, stock decremented under guard, loyalty
    /// credited, notifications queued. On success the cart is cleared and
    /// queued events are broadcast; on any failure the cart is untouched.
    pub async fn finalize(
        &mut self,
        customer_name: &str,
        payment_method: &str,
    ) -> EngineResult<CommittedSale> {
        let customer_name = validate_name("customer name", customer_name)?;
        let payment_method = parse_payment_method(payment_method)?;

        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let customer = self
            .db
            .customers()
            .get_by_name(&customer_name)
            .await
            .map_err(|e| or_domain(e, CoreError::CustomerNotFound))?;

        let committed = self
            .db
            .checkout()
            .finalize(SaleDraft {
                customer,
                cart: self.cart.clone(),
                payment_method,
            })
            .await?;

        // Committed: the cart must not survive into the next sale.
        self.cart.clear();

        info!(
            sale_id = %committed.sale.id,
            total_cents = committed.sale.total_cents,
            "sale finalized"
        );

        self.broadcast_after_commit().await;
        Ok(committed)
    }

    /// Processes a return against a committed sale.
    ///
    /// Independent of any in-progress cart. All lines are validated before
    /// anything is written; one bad line rejects the whole request.
    pub async fn process_return(
        &self,
        sale_id: &str,
        lines: &[ReturnLine],
    ) -> EngineResult<ProcessedReturn> {
        // Surface a missing sale as the domain error, not a store miss.
        self.db
            .sales()
            .get_by_id(sale_id)
            .await
            .map_err(|e| or_domain(e, CoreError::SaleNotFound))?;

        let outcome = self.db.checkout().process_return(sale_id, lines).await?;

        info!(
            sale_id = %sale_id,
            refund_cents = outcome.refund.cents(),
            "return processed"
        );

        self.broadcast_after_commit().await;
        Ok(outcome)
    }

    /// Receipt data for a committed sale.
    pub async fn receipt(&self, sale_id: &str) -> EngineResult<ReceiptData> {
        self.db
            .sales()
            .receipt_data(sale_id)
            .await
            .map_err(|e| or_domain(e, CoreError::SaleNotFound))
    }

    /// Drains the outbox and publishes a low-stock alert when warranted.
    ///
    /// Best-effort by contract: the transaction already committed, so a
    /// notification failure is logged and swallowed, never surfaced.
    async fn broadcast_after_commit(&self) {
        if let Err(e) = self.events.drain_outbox(&self.db).await {
            warn!(error = %e, "outbox drain failed, events remain queued");
        }

        match self.db.products().low_stock().await {
            Ok(low) if !low.is_empty() => {
                let products = low
                    .into_iter()
                    .map(|p| LowStockProduct {
                        product_id: p.id,
                        name: p.name,
                        quantity: p.quantity,
                        min_stock: p.min_stock,
                    })
                    .collect();
                self.events.publish(PosEvent::LowStockAlert { products });
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "low-stock check failed"),
        }
    }
}
