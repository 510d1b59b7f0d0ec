//! Notification model
//!
//! The core only writes notification rows; delivery and read-tracking are
//! handled by an external collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::enums::NotificationType;
use super::equipment::EquipmentRecord;
use super::request::LoanRequest;

/// Stored notification row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub lab_id: Option<String>,
    pub recipient_user_id: Option<i32>,
    pub metadata: Json<NotificationMetadata>,
    pub created_at: DateTime<Utc>,
}

/// Fields for writing a new notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub lab_id: Option<String>,
    pub recipient_user_id: Option<i32>,
    pub metadata: NotificationMetadata,
}

/// Context attached to every notification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationMetadata {
    pub request_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub requester_id: Option<i32>,
    pub quantity: Option<i32>,
    pub date_to_return: Option<DateTime<Utc>>,
}

impl NotificationMetadata {
    /// Build metadata from a request and the equipment it refers to
    pub fn for_request(request: &LoanRequest, equipment: &EquipmentRecord) -> Self {
        Self {
            request_id: Some(request.id),
            equipment_id: Some(equipment.id),
            equipment_name: Some(equipment.name.clone()),
            requester_id: Some(request.requester_id),
            quantity: Some(request.quantity),
            date_to_return: request.date_to_return,
        }
    }
}
