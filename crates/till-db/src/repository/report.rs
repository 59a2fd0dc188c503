//! Reporting queries.
//!
//! Aggregations over committed sales and expenses. These read the same
//! tables the checkout transaction writes, so figures already reflect any
//! returns processed (returns reduce `sales.total_cents` in place).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use till_core::Money;

use crate::error::StoreResult;

/// Sales aggregate for a period.
#[derive(Debug, Clone)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub gross: Money,
    pub expenses: Money,
}

impl SalesSummary {
    /// Gross sales minus expenses. May be negative.
    pub fn net(&self) -> Money {
        self.gross - self.expenses
    }
}

/// A product ranked by units sold.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: String,
    pub name_snapshot: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales and expense totals in the half-open interval `[from, to)`.
    pub async fn sales_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<SalesSummary> {
        let (sale_count, gross_cents): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE created_at >= ? AND created_at < ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let expense_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses \
             WHERE spent_at >= ? AND spent_at < ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            sale_count,
            gross: Money::from_cents(gross_cents),
            expenses: Money::from_cents(expense_cents),
        })
    }

    /// Best-selling products by units across all committed sales.
    ///
    /// Revenue is computed from the frozen line snapshots, so later catalog
    /// price changes do not rewrite history.
    pub async fn top_products(&self, limit: i64) -> StoreResult<Vec<TopProduct>> {
        Ok(sqlx::query_as::<_, TopProduct>(
            "SELECT product_id, name_snapshot, \
                    SUM(quantity) AS units_sold, \
                    SUM(quantity * unit_price_cents) AS revenue_cents \
             FROM sale_items \
             GROUP BY product_id, name_snapshot \
             ORDER BY units_sold DESC, name_snapshot \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
