//! Request intake and listing

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{CreateBatchRequest, CreateRequest, LoanRequest, NewLoanRequest, RequestFilter},
        NotificationType, RequestStatus,
    },
    repository::Repository,
};

use super::{notifications::NotificationService, transitions::partial_write};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    notifications: NotificationService,
}

impl RequestsService {
    pub fn new(repository: Repository, notifications: NotificationService) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<LoanRequest> {
        self.repository.requests.get(id).await
    }

    pub async fn list(&self, filter: RequestFilter) -> AppResult<Vec<LoanRequest>> {
        self.repository.requests.list(&filter).await
    }

    /// Submit a single pending request
    pub async fn create(&self, body: CreateRequest) -> AppResult<LoanRequest> {
        let equipment = self.repository.equipment.get(body.equipment_id).await?;
        let request = self
            .repository
            .requests
            .insert(&NewLoanRequest {
                equipment_id: equipment.id,
                category_id: equipment.category_id,
                requester_id: body.requester_id,
                quantity: body.quantity.unwrap_or(1),
                batch_id: None,
                batch_size: None,
                date_to_be_used: body.date_to_be_used,
                date_to_return: body.date_to_return,
            })
            .await?;

        self.notifications
            .notify(NotificationType::NewRequest, &request, &equipment)
            .await
            .map_err(|e| partial_write("new request notification", e))?;

        Ok(request)
    }

    /// Submit several requests sharing a freshly generated batch identifier
    pub async fn create_batch(&self, body: CreateBatchRequest) -> AppResult<Vec<LoanRequest>> {
        // Resolve all equipment up front so a bad id fails before any insert.
        let mut resolved = Vec::with_capacity(body.items.len());
        for item in &body.items {
            let equipment = self.repository.equipment.get(item.equipment_id).await?;
            resolved.push((equipment, item.quantity.unwrap_or(1)));
        }

        let batch_id = Uuid::new_v4();
        let batch_size = resolved.len() as i32;
        let mut created = Vec::with_capacity(resolved.len());

        for (equipment, quantity) in &resolved {
            let request = self
                .repository
                .requests
                .insert(&NewLoanRequest {
                    equipment_id: equipment.id,
                    category_id: equipment.category_id,
                    requester_id: body.requester_id,
                    quantity: *quantity,
                    batch_id: Some(batch_id),
                    batch_size: Some(batch_size),
                    date_to_be_used: body.date_to_be_used,
                    date_to_return: body.date_to_return,
                })
                .await
                .map_err(|e| {
                    if created.is_empty() {
                        e
                    } else {
                        partial_write("batch request insert", e)
                    }
                })?;

            self.notifications
                .notify(NotificationType::NewRequest, &request, equipment)
                .await
                .map_err(|e| partial_write("new request notification", e))?;

            created.push(request);
        }

        Ok(created)
    }

    /// Cancel a request that is still pending
    ///
    /// No ledger effect: nothing was reserved yet.
    pub async fn cancel(&self, id: i32) -> AppResult<()> {
        let request = self.repository.requests.get(id).await?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Only pending requests can be cancelled (request {} is {})",
                id, request.status
            )));
        }
        self.repository.requests.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{fixture, pending_request};

    #[tokio::test]
    async fn creating_a_request_fires_a_new_request_notification() {
        let fx = fixture(5).await;

        let request = fx
            .requests
            .create(CreateRequest {
                equipment_id: fx.equipment_id,
                requester_id: 7,
                quantity: Some(2),
                date_to_be_used: None,
                date_to_return: None,
            })
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.quantity, 2);
        let notifications = fx.store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].notification_type,
            crate::models::NotificationType::NewRequest
        );
    }

    #[tokio::test]
    async fn batch_creation_shares_one_batch_id() {
        let fx = fixture(5).await;

        let created = fx
            .requests
            .create_batch(CreateBatchRequest {
                requester_id: 7,
                items: vec![
                    crate::models::request::BatchItem {
                        equipment_id: fx.equipment_id,
                        quantity: Some(1),
                    },
                    crate::models::request::BatchItem {
                        equipment_id: fx.equipment_id,
                        quantity: Some(2),
                    },
                ],
                date_to_be_used: None,
                date_to_return: None,
            })
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert!(created[0].batch_id.is_some());
        assert_eq!(created[0].batch_id, created[1].batch_id);
        assert_eq!(created[0].batch_size, Some(2));
    }

    #[tokio::test]
    async fn only_pending_requests_can_be_cancelled() {
        let fx = fixture(5).await;
        let request = pending_request(&fx, 1).await;

        fx.engine
            .transition(request.id, RequestStatus::Approved, None)
            .await
            .unwrap();
        let err = fx.requests.cancel(request.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let cancellable = pending_request(&fx, 1).await;
        fx.requests.cancel(cancellable.id).await.unwrap();
        assert!(fx.repository.requests.get(cancellable.id).await.is_err());
    }
}
