//! Postgres request store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::RequestStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{LoanRequest, NewLoanRequest, RequestFilter},
        RequestStatus,
    },
};

#[derive(Clone)]
pub struct PgRequestStore {
    pool: Pool<Postgres>,
}

impl PgRequestStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn get(&self, id: i32) -> AppResult<LoanRequest> {
        sqlx::query_as::<_, LoanRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::RequestNotFound(id))
    }

    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<LoanRequest>> {
        let rows = sqlx::query_as::<_, LoanRequest>(
            r#"
            SELECT * FROM requests
            WHERE ($1::request_status IS NULL OR status = $1)
              AND ($2::integer IS NULL OR requester_id = $2)
              AND ($3::integer IS NULL OR equipment_id = $3)
            ORDER BY requested_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.requester_id)
        .bind(filter.equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn by_batch(&self, batch_id: Uuid) -> AppResult<Vec<LoanRequest>> {
        let rows = sqlx::query_as::<_, LoanRequest>(
            "SELECT * FROM requests WHERE batch_id = $1 ORDER BY id",
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, request: &NewLoanRequest) -> AppResult<LoanRequest> {
        let row = sqlx::query_as::<_, LoanRequest>(
            r#"
            INSERT INTO requests (
                equipment_id, category_id, requester_id, quantity,
                batch_id, batch_size, date_to_be_used, date_to_return
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.equipment_id)
        .bind(request.category_id)
        .bind(request.requester_id)
        .bind(request.quantity)
        .bind(request.batch_id)
        .bind(request.batch_size)
        .bind(request.date_to_be_used)
        .bind(request.date_to_return)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_status(&self, id: i32, status: RequestStatus) -> AppResult<LoanRequest> {
        let row = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE requests
            SET status = $2,
                updated_at = NOW(),
                released_at = CASE WHEN $2 = 'released'::request_status
                                   THEN NOW() ELSE released_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::RequestNotFound(id))
    }

    async fn remove(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::RequestNotFound(id));
        }
        Ok(())
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanRequest>> {
        let rows = sqlx::query_as::<_, LoanRequest>(
            r#"
            SELECT * FROM requests
            WHERE status IN ('released'::request_status, 'in_progress'::request_status)
              AND date_to_return IS NOT NULL
              AND date_to_return < $1
            ORDER BY date_to_return
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
