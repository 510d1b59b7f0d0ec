//! Notification triggering
//!
//! Builds the title/message pair for each lifecycle event and writes it
//! through the sink. Delivery is someone else's job.

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        equipment::EquipmentRecord,
        notification::{NewNotification, NotificationMetadata},
        request::LoanRequest,
        NotificationType,
    },
    repository::NotificationSink,
};

#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Write one notification for a lifecycle event on `request`
    pub async fn notify(
        &self,
        kind: NotificationType,
        request: &LoanRequest,
        equipment: &EquipmentRecord,
    ) -> AppResult<()> {
        let (title, message) = match kind {
            NotificationType::NewRequest => (
                "New borrow request".to_string(),
                format!(
                    "User {} requested {} x {}",
                    request.requester_id, request.quantity, equipment.name
                ),
            ),
            NotificationType::RequestApproved => (
                "Borrow request approved".to_string(),
                format!(
                    "Request {} for {} x {} was approved",
                    request.id, request.quantity, equipment.name
                ),
            ),
            NotificationType::RequestRejected => (
                "Borrow request rejected".to_string(),
                format!(
                    "Request {} for {} x {} was rejected",
                    request.id, request.quantity, equipment.name
                ),
            ),
            NotificationType::EquipmentReturned => (
                "Equipment returned".to_string(),
                format!(
                    "Request {}: {} x {} returned",
                    request.id, request.quantity, equipment.name
                ),
            ),
            NotificationType::EquipmentOverdue => (
                "Equipment overdue".to_string(),
                match request.date_to_return {
                    Some(due) => format!(
                        "Request {}: {} x {} was due back on {}",
                        request.id,
                        request.quantity,
                        equipment.name,
                        due.format("%Y-%m-%d")
                    ),
                    None => format!(
                        "Request {}: {} x {} is overdue",
                        request.id, request.quantity, equipment.name
                    ),
                },
            ),
        };

        // Approvals, rejections and returns go back to the requester;
        // new-request and overdue notices fan out to lab managers externally.
        let recipient = match kind {
            NotificationType::RequestApproved
            | NotificationType::RequestRejected
            | NotificationType::EquipmentReturned => Some(request.requester_id),
            NotificationType::NewRequest | NotificationType::EquipmentOverdue => None,
        };

        self.sink
            .push(&NewNotification {
                notification_type: kind,
                title,
                message,
                lab_id: equipment.lab_id.clone(),
                recipient_user_id: recipient,
                metadata: NotificationMetadata::for_request(request, equipment),
            })
            .await
    }
}
