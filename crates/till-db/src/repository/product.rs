//! Product catalog repository.
//!
//! Products are resolved by unique name at the point of sale, so both
//! id and name lookups exist. Stock mutations that must be atomic with a
//! sale live in [`crate::checkout`], not here; `adjust_stock` is for
//! manual corrections and purchase order receipts.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use till_core::{Money, Percent, Product};

use crate::error::{StoreError, StoreResult};

const PRODUCT_COLUMNS: &str = "id, name, category, quantity, price_cents, \
     discount_bps, min_stock, supplier_id, created_at, updated_at";

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub price: Money,
    pub discount: Percent,
    pub min_stock: i64,
    pub supplier_id: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Money) -> Self {
        NewProduct {
            name: name.into(),
            category: category.into(),
            quantity: 0,
            price,
            discount: Percent::zero(),
            min_stock: 5,
            supplier_id: None,
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn discount(mut self, discount: Percent) -> Self {
        self.discount = discount;
        self
    }

    pub fn min_stock(mut self, min_stock: i64) -> Self {
        self.min_stock = min_stock;
        self
    }

    pub fn supplier(mut self, supplier_id: impl Into<String>) -> Self {
        self.supplier_id = Some(supplier_id.into());
        self
    }
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub category: Option<String>,
    pub price: Option<Money>,
    pub discount: Option<Percent>,
    pub min_stock: Option<i64>,
    pub supplier_id: Option<Option<String>>,
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product and returns the stored row.
    pub async fn create(&self, new: NewProduct) -> StoreResult<Product> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO products \
             (id, name, category, quantity, price_cents, discount_bps, \
              min_stock, supplier_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.category)
        .bind(new.quantity)
        .bind(new.price.cents())
        .bind(new.discount.bps())
        .bind(new.min_stock)
        .bind(&new.supplier_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(product_id = %id, name = %new.name, "product created");
        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Product> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    /// Looks a product up by its unique name. This is the point-of-sale
    /// lookup path.
    pub async fn get_by_name(&self, name: &str) -> StoreResult<Product> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?");
        sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("product", name))
    }

    /// All products, ordered by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        Ok(sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Case-insensitive substring search over name and category.
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Product>> {
        let pattern = format!("%{term}%");
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE ? OR category LIKE ? ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Products whose on-hand quantity is strictly below their restock
    /// threshold. Feeds the low-stock alert and auto purchase orders.
    pub async fn low_stock(&self) -> StoreResult<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE quantity < min_stock ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Applies a partial update. Name is immutable; sale history snapshots
    /// it and operators resolve products by it.
    pub async fn update(&self, id: &str, update: ProductUpdate) -> StoreResult<Product> {
        let current = self.get_by_id(id).await?;

        let category = update.category.unwrap_or(current.category);
        let price_cents = update.price.map(|m| m.cents()).unwrap_or(current.price_cents);
        let discount_bps = update.discount.map(|p| p.bps()).unwrap_or(current.discount_bps);
        let min_stock = update.min_stock.unwrap_or(current.min_stock);
        let supplier_id = update.supplier_id.unwrap_or(current.supplier_id);

        sqlx::query(
            "UPDATE products SET category = ?, price_cents = ?, discount_bps = ?, \
             min_stock = ?, supplier_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&category)
        .bind(price_cents)
        .bind(discount_bps)
        .bind(min_stock)
        .bind(&supplier_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Adjusts on-hand stock by a signed delta (restock or correction).
    ///
    /// Guarded: a negative delta that would take quantity below zero
    /// affects no rows and fails with a CheckViolation.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<Product> {
        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + ?, updated_at = ? \
             WHERE id = ? AND quantity + ? >= 0",
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the product is missing or the delta would go negative.
            let current = self.get_by_id(id).await?;
            return Err(StoreError::CheckViolation {
                message: format!(
                    "stock adjustment of {delta} would take {} below zero (current: {})",
                    current.name, current.quantity
                ),
            });
        }

        debug!(product_id = %id, delta, "stock adjusted");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn create_and_lookup_by_name() {
        let db = db().await;
        let products = db.products();

        let created = products
            .create(
                NewProduct::new("Cola 330ml", "Beverages", Money::from_cents(150))
                    .quantity(20)
                    .min_stock(5),
            )
            .await
            .unwrap();

        let found = products.get_by_name("Cola 330ml").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.quantity, 20);
        assert_eq!(found.price_cents, 150);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let db = db().await;
        let products = db.products();

        products
            .create(NewProduct::new("Cola 330ml", "Beverages", Money::from_cents(150)))
            .await
            .unwrap();

        let err = products
            .create(NewProduct::new("Cola 330ml", "Beverages", Money::from_cents(175)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn absurd_price_is_rejected() {
        let db = db().await;
        let products = db.products();

        let err = products
            .create(NewProduct::new(
                "Gold Bar",
                "Misc",
                Money::from_cents(Money::MAX_CENTS + 1),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation { .. }));

        // the cap itself is storable
        products
            .create(NewProduct::new(
                "Yacht",
                "Misc",
                Money::from_cents(Money::MAX_CENTS),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn low_stock_uses_strict_threshold() {
        let db = db().await;
        let products = db.products();

        products
            .create(
                NewProduct::new("At threshold", "Misc", Money::from_cents(100))
                    .quantity(5)
                    .min_stock(5),
            )
            .await
            .unwrap();
        products
            .create(
                NewProduct::new("Below threshold", "Misc", Money::from_cents(100))
                    .quantity(4)
                    .min_stock(5),
            )
            .await
            .unwrap();

        let low = products.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Below threshold");
    }

    #[tokio::test]
    async fn adjust_stock_never_goes_negative() {
        let db = db().await;
        let products = db.products();

        let p = products
            .create(NewProduct::new("Chips", "Snacks", Money::from_cents(250)).quantity(3))
            .await
            .unwrap();

        let after = products.adjust_stock(&p.id, -2).await.unwrap();
        assert_eq!(after.quantity, 1);

        let err = products.adjust_stock(&p.id, -2).await.unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation { .. }));

        let unchanged = products.get_by_id(&p.id).await.unwrap();
        assert_eq!(unchanged.quantity, 1);
    }
}
