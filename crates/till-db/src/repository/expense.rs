//! Operating expense repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use till_core::{Expense, Money};

use crate::error::{StoreError, StoreResult};

const EXPENSE_COLUMNS: &str = "id, category, amount_cents, description, spent_at";

/// Fields for recording an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: Money,
    pub description: Option<String>,
    /// Defaults to now when None.
    pub spent_at: Option<DateTime<Utc>>,
}

impl NewExpense {
    pub fn new(category: impl Into<String>, amount: Money) -> Self {
        NewExpense {
            category: category.into(),
            amount,
            description: None,
            spent_at: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn spent_at(mut self, at: DateTime<Utc>) -> Self {
        self.spent_at = Some(at);
        self
    }
}

/// Repository for expense records.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    pub async fn add(&self, new: NewExpense) -> StoreResult<Expense> {
        let id = Uuid::new_v4().to_string();
        let spent_at = new.spent_at.unwrap_or_else(Utc::now);

        sqlx::query(
            "INSERT INTO expenses (id, category, amount_cents, description, spent_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.category)
        .bind(new.amount.cents())
        .bind(&new.description)
        .bind(spent_at)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Expense> {
        let query = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?");
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("expense", id))
    }

    /// Most recent expenses first.
    pub async fn list(&self) -> StoreResult<Vec<Expense>> {
        let query = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY spent_at DESC");
        Ok(sqlx::query_as::<_, Expense>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Total spend in the half-open interval `[from, to)`.
    pub async fn total_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
             WHERE spent_at >= ? AND spent_at < ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(Money::from_cents(cents))
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("expense", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    #[tokio::test]
    async fn add_and_total_between() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let expenses = db.expenses();

        let now = Utc::now();
        expenses
            .add(NewExpense::new("Rent", Money::from_cents(50_000)).spent_at(now))
            .await
            .unwrap();
        expenses
            .add(
                NewExpense::new("Utilities", Money::from_cents(12_000))
                    .spent_at(now - Duration::days(40)),
            )
            .await
            .unwrap();

        let this_month = expenses
            .total_between(now - Duration::days(30), now + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(this_month.cents(), 50_000);
    }
}
