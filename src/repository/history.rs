//! Postgres history log

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::HistoryLog;
use crate::{
    error::AppResult,
    models::history::{HistoryEntry, HistoryFilter, NewHistoryEntry},
};

#[derive(Clone)]
pub struct PgHistoryLog {
    pool: Pool<Postgres>,
}

impl PgHistoryLog {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryLog for PgHistoryLog {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry> {
        let row = sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO history (
                request_id, equipment_id, category_id, entry_type, status,
                quantity, timestamp, released_date, return_date, date_to_return,
                condition, return_details, processed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(entry.request_id)
        .bind(entry.equipment_id)
        .bind(entry.category_id)
        .bind(entry.entry_type)
        .bind(&entry.status)
        .bind(entry.quantity)
        .bind(entry.timestamp)
        .bind(entry.released_date)
        .bind(entry.return_date)
        .bind(entry.date_to_return)
        .bind(&entry.condition)
        .bind(entry.return_details.clone().map(Json))
        .bind(&entry.processed_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn retract_rejection(&self, request_id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM history WHERE request_id = $1 AND entry_type = 'rejection'::history_entry_type",
        )
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn has_release_entry(&self, request_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM history WHERE request_id = $1 AND entry_type = 'release'::history_entry_type)",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list(&self, filter: &HistoryFilter) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT * FROM history
            WHERE ($1::integer IS NULL OR request_id = $1)
              AND ($2::integer IS NULL OR equipment_id = $2)
              AND ($3::history_entry_type IS NULL OR entry_type = $3)
            ORDER BY timestamp DESC
            "#,
        )
        .bind(filter.request_id)
        .bind(filter.equipment_id)
        .bind(filter.entry_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
