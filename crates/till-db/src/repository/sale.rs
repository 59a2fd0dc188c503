//! Sale history repository (read side).
//!
//! Sales and their items are written only by the checkout transaction in
//! [`crate::checkout`]; this repository reads them back for receipts,
//! return validation, and history views.

use sqlx::SqlitePool;

use till_core::{ReceiptData, ReceiptLine, Sale, SaleItem};

use crate::error::{StoreError, StoreResult};

const SALE_COLUMNS: &str = "id, customer_id, total_cents, discount_bps, payment_method, created_at";

const SALE_ITEM_COLUMNS: &str =
    "id, sale_id, product_id, name_snapshot, quantity, unit_price_cents, created_at";

/// Repository for committed sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Sale> {
        let query = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?");
        sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("sale", id))
    }

    /// Items of a sale in original cart insertion order.
    pub async fn items(&self, sale_id: &str) -> StoreResult<Vec<SaleItem>> {
        let query =
            format!("SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ? ORDER BY rowid");
        Ok(sqlx::query_as::<_, SaleItem>(&query)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: i64) -> StoreResult<Vec<Sale>> {
        let query = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC, id LIMIT ?"
        );
        Ok(sqlx::query_as::<_, Sale>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    /// All sales for one customer, most recent first.
    pub async fn list_for_customer(&self, customer_id: &str) -> StoreResult<Vec<Sale>> {
        let query = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE customer_id = ? ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Sale>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Assembles everything a receipt generator needs for one sale.
    pub async fn receipt_data(&self, sale_id: &str) -> StoreResult<ReceiptData> {
        let sale = self.get_by_id(sale_id).await?;

        let customer_name: String =
            sqlx::query_scalar("SELECT name FROM customers WHERE id = ?")
                .bind(&sale.customer_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::not_found("customer", &sale.customer_id))?;

        let lines = self
            .items(sale_id)
            .await?
            .into_iter()
            .map(|item| ReceiptLine {
                name: item.name_snapshot,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            })
            .collect();

        Ok(ReceiptData {
            sale_id: sale.id,
            date: sale.created_at,
            customer_name,
            total_cents: sale.total_cents,
            discount_bps: sale.discount_bps,
            payment_method: sale.payment_method,
            lines,
        })
    }

    pub async fn count(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Cart, Customer, Money, PaymentMethod};

    use crate::checkout::SaleDraft;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;
    use crate::repository::product::NewProduct;

    async fn commit_sale(db: &Database, customer: &Customer, quantity: i64) -> Sale {
        let product = db.products().get_by_name("Cola 330ml").await.unwrap();
        let mut cart = Cart::new();
        cart.add_line(&product, quantity).unwrap();
        db.checkout()
            .finalize(SaleDraft {
                customer: customer.clone(),
                cart,
                payment_method: PaymentMethod::Cash,
            })
            .await
            .unwrap()
            .sale
    }

    async fn setup() -> (Database, Customer, Customer) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .create(NewProduct::new("Cola 330ml", "Beverages", Money::from_cents(150)).quantity(50))
            .await
            .unwrap();
        let ayesha = db
            .customers()
            .create(NewCustomer::new("Ayesha Khan"))
            .await
            .unwrap();
        let bilal = db
            .customers()
            .create(NewCustomer::new("Bilal"))
            .await
            .unwrap();
        (db, ayesha, bilal)
    }

    #[tokio::test]
    async fn list_recent_honors_limit() {
        let (db, ayesha, _) = setup().await;

        let mut ids = Vec::new();
        for quantity in 1..=3 {
            ids.push(commit_sale(&db, &ayesha, quantity).await.id);
        }

        let recent = db.sales().list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|s| ids.contains(&s.id)));

        let all = db.sales().list_recent(10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn list_for_customer_filters() {
        let (db, ayesha, bilal) = setup().await;

        let hers = commit_sale(&db, &ayesha, 1).await;
        commit_sale(&db, &bilal, 2).await;

        let sales = db.sales().list_for_customer(&ayesha.id).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, hers.id);
        assert_eq!(sales[0].total_cents, 150);

        let none = db.sales().list_for_customer("no-such-customer").await.unwrap();
        assert!(none.is_empty());
    }
}
