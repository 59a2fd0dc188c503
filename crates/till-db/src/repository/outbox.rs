//! Transactional event outbox.
//!
//! Events that must ride along with a committing transaction (new sale,
//! inventory updates) are inserted as outbox rows inside that transaction
//! via [`insert_event`], then drained and broadcast after commit. An event
//! therefore exists if and only if the write that caused it is durable.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use till_core::{OutboxEvent, PosEvent};

use crate::error::{StoreError, StoreResult};

const OUTBOX_COLUMNS: &str = "id, event_type, payload, created_at, published_at";

/// Queues an event on any executor, usually an open transaction.
///
/// Serialization failures abort the caller's transaction, which is the
/// point: a sale whose notification cannot be recorded does not commit.
pub async fn insert_event<'e, E>(executor: E, event: &PosEvent) -> StoreResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let payload = serde_json::to_string(event)
        .map_err(|e| StoreError::Internal(format!("event serialization failed: {e}")))?;

    sqlx::query(
        "INSERT INTO event_outbox (id, event_type, payload, created_at, published_at) \
         VALUES (?, ?, ?, ?, NULL)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(event.event_type())
    .bind(&payload)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for draining and maintaining the outbox.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: SqlitePool,
}

impl OutboxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OutboxRepository { pool }
    }

    /// Oldest unpublished events first.
    pub async fn pending(&self, limit: i64) -> StoreResult<Vec<OutboxEvent>> {
        let query = format!(
            "SELECT {OUTBOX_COLUMNS} FROM event_outbox \
             WHERE published_at IS NULL ORDER BY created_at, id LIMIT ?"
        );
        Ok(sqlx::query_as::<_, OutboxEvent>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Marks an event as broadcast.
    pub async fn mark_published(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE event_outbox SET published_at = ? WHERE id = ? AND published_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("outbox event", id));
        }
        debug!(event_id = %id, "outbox event published");
        Ok(())
    }

    pub async fn count_pending(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?)
    }

    /// Deletes published events older than the given number of days.
    pub async fn cleanup(&self, older_than_days: i64) -> StoreResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(older_than_days);
        let result = sqlx::query(
            "DELETE FROM event_outbox WHERE published_at IS NOT NULL AND published_at < ?",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn insert_pending_publish_cycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();

        let event = PosEvent::InventoryUpdated {
            product_id: "p1".to_string(),
            new_quantity: 7,
        };
        insert_event(db.pool(), &event).await.unwrap();

        assert_eq!(outbox.count_pending().await.unwrap(), 1);

        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_type, "inventory_updated");

        let decoded: PosEvent = serde_json::from_str(&pending[0].payload).unwrap();
        assert!(matches!(decoded, PosEvent::InventoryUpdated { new_quantity: 7, .. }));

        outbox.mark_published(&pending[0].id).await.unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cleanup_removes_only_published_events() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();

        for quantity in [1, 2] {
            let event = PosEvent::InventoryUpdated {
                product_id: "p1".to_string(),
                new_quantity: quantity,
            };
            insert_event(db.pool(), &event).await.unwrap();
        }
        let pending = outbox.pending(10).await.unwrap();
        outbox.mark_published(&pending[0].id).await.unwrap();

        // a zero-day horizon would reap everything already published
        let removed = outbox.cleanup(0).await.unwrap();
        assert_eq!(removed, 1);

        // the unpublished event survives and can still be drained
        assert_eq!(outbox.count_pending().await.unwrap(), 1);
        let left = outbox.pending(10).await.unwrap();
        assert_eq!(left[0].id, pending[1].id);
    }

    #[tokio::test]
    async fn rolled_back_event_never_appears() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let event = PosEvent::InventoryUpdated {
            product_id: "p1".to_string(),
            new_quantity: 0,
        };
        insert_event(&mut *tx, &event).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.outbox().count_pending().await.unwrap(), 0);
    }
}
