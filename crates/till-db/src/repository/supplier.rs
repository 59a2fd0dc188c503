//! Supplier repository.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use till_core::Supplier;

use crate::error::{StoreError, StoreResult};

const SUPPLIER_COLUMNS: &str = "id, name, contact, email, created_at";

/// Fields for creating a supplier.
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl NewSupplier {
    pub fn new(name: impl Into<String>) -> Self {
        NewSupplier {
            name: name.into(),
            contact: None,
            email: None,
        }
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Repository for supplier operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn create(&self, new: NewSupplier) -> StoreResult<Supplier> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO suppliers (id, name, contact, email, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.contact)
        .bind(&new.email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Supplier> {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("supplier", id))
    }

    pub async fn get_by_name(&self, name: &str) -> StoreResult<Supplier> {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE name = ?");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("supplier", name))
    }

    pub async fn list(&self) -> StoreResult<Vec<Supplier>> {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name");
        Ok(sqlx::query_as::<_, Supplier>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Replaces a supplier's contact details.
    pub async fn update_contact(
        &self,
        id: &str,
        contact: Option<String>,
        email: Option<String>,
    ) -> StoreResult<Supplier> {
        let result = sqlx::query("UPDATE suppliers SET contact = ?, email = ? WHERE id = ?")
            .bind(&contact)
            .bind(&email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("supplier", id));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("supplier", id));
        }
        Ok(())
    }
}
