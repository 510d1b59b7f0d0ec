//! Postgres notification outbox

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::NotificationSink;
use crate::{error::AppResult, models::notification::NewNotification};

#[derive(Clone)]
pub struct PgNotificationSink {
    pool: Pool<Postgres>,
}

impl PgNotificationSink {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
    async fn push(&self, notification: &NewNotification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_type, title, message, lab_id, recipient_user_id, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.notification_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.lab_id)
        .bind(notification.recipient_user_id)
        .bind(Json(notification.metadata.clone()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_overdue_notice(&self, request_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE notification_type = 'equipment_overdue'::notification_type
                  AND (metadata ->> 'request_id')::integer = $1
            )
            "#,
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
