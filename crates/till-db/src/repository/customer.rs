//! Customer repository.
//!
//! Customers are resolved by unique name at finalize time. Loyalty point
//! credits that must be atomic with a sale happen inside the checkout
//! transaction; `credit_points` here is for manual adjustments.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use till_core::Customer;

use crate::error::{StoreError, StoreResult};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, loyalty_points, created_at";

/// Fields for creating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>) -> Self {
        NewCustomer {
            name: name.into(),
            phone: None,
            email: None,
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Repository for customer operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, new: NewCustomer) -> StoreResult<Customer> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO customers (id, name, phone, email, loyalty_points, created_at) \
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(customer_id = %id, name = %new.name, "customer created");
        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Customer> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("customer", id))
    }

    /// Looks a customer up by unique name, the finalize-time resolution path.
    pub async fn get_by_name(&self, name: &str) -> StoreResult<Customer> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE name = ?");
        sqlx::query_as::<_, Customer>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("customer", name))
    }

    pub async fn list(&self) -> StoreResult<Vec<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name");
        Ok(sqlx::query_as::<_, Customer>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Replaces a customer's contact details. Name is immutable; sales
    /// resolve customers by it.
    pub async fn update_contact(
        &self,
        id: &str,
        phone: Option<String>,
        email: Option<String>,
    ) -> StoreResult<Customer> {
        let result = sqlx::query("UPDATE customers SET phone = ?, email = ? WHERE id = ?")
            .bind(&phone)
            .bind(&email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", id));
        }
        self.get_by_id(id).await
    }

    /// Manual loyalty point adjustment. The schema keeps the balance
    /// non-negative.
    pub async fn credit_points(&self, id: &str, delta: i64) -> StoreResult<Customer> {
        let result = sqlx::query(
            "UPDATE customers SET loyalty_points = loyalty_points + ? WHERE id = ?",
        )
        .bind(delta)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", id));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn create_lookup_and_credit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customers = db.customers();

        let c = customers
            .create(NewCustomer::new("Ayesha Khan").phone("0300-1234567"))
            .await
            .unwrap();
        assert_eq!(c.loyalty_points, 0);

        let found = customers.get_by_name("Ayesha Khan").await.unwrap();
        assert_eq!(found.id, c.id);

        let credited = customers.credit_points(&c.id, 4).await.unwrap();
        assert_eq!(credited.loyalty_points, 4);
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.customers().get_by_name("Nobody").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
