//! Status transition engine
//!
//! The request lifecycle state machine. Each edge mutates the inventory
//! ledger at most once, and every incrementing edge has exactly one
//! decrementing counterpart:
//!
//! ```text
//! pending  -> approved     reserve(qty)          notify approved
//! pending  -> rejected     -                     rejection entry, notify rejected
//! approved -> rejected     release(qty)          rejection entry, notify rejected
//! approved -> released     -                     release entry
//! released -> in_progress  -                     -
//! rejected -> approved     reserve(qty)          retract rejection entry, notify approved
//! ```
//!
//! Returns (`released|in_progress -> returned`) are handled by the return
//! processor. Failures before the first write abort cleanly; failures after
//! it surface as `PartialWrite` with no rollback of the earlier writes.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::EquipmentRecord,
        history::NewHistoryEntry,
        request::LoanRequest,
        HistoryEntryType, NotificationType, RequestStatus,
    },
    repository::Repository,
};

use super::notifications::NotificationService;

/// Whether the state machine has an edge from `from` to `to`
pub fn edge_allowed(from: RequestStatus, to: RequestStatus) -> bool {
    matches!(
        (from, to),
        (RequestStatus::Pending, RequestStatus::Approved)
            | (RequestStatus::Pending, RequestStatus::Rejected)
            | (RequestStatus::Approved, RequestStatus::Rejected)
            | (RequestStatus::Approved, RequestStatus::Released)
            | (RequestStatus::Released, RequestStatus::InProgress)
            | (RequestStatus::Rejected, RequestStatus::Approved)
    )
}

/// Wrap an error that struck after an earlier write already succeeded
pub(crate) fn partial_write(operation: &str, err: AppError) -> AppError {
    tracing::error!(
        operation,
        error = %err,
        "partial write: earlier writes in this transition are not rolled back"
    );
    AppError::PartialWrite {
        operation: operation.to_string(),
        detail: err.to_string(),
    }
}

#[derive(Clone)]
pub struct TransitionEngine {
    repository: Repository,
    notifications: NotificationService,
}

impl TransitionEngine {
    pub fn new(repository: Repository, notifications: NotificationService) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Apply one status transition to a request
    pub async fn transition(
        &self,
        request_id: i32,
        target: RequestStatus,
        processed_by: Option<String>,
    ) -> AppResult<LoanRequest> {
        let request = self.repository.requests.get(request_id).await?;
        let equipment = self.repository.equipment.get(request.equipment_id).await?;

        match (request.status, target) {
            (RequestStatus::Pending, RequestStatus::Approved) => {
                self.approve(request, equipment).await
            }
            (RequestStatus::Pending, RequestStatus::Rejected) => {
                self.reject(request, equipment, false, processed_by).await
            }
            (RequestStatus::Approved, RequestStatus::Rejected) => {
                self.reject(request, equipment, true, processed_by).await
            }
            (RequestStatus::Approved, RequestStatus::Released) => {
                self.release(request, processed_by).await
            }
            (RequestStatus::Released, RequestStatus::InProgress) => {
                self.repository
                    .requests
                    .set_status(request.id, RequestStatus::InProgress)
                    .await
            }
            (RequestStatus::Rejected, RequestStatus::Approved) => {
                self.undo_rejection(request, equipment).await
            }
            (from, to) => Err(AppError::InvalidTransition { from, to }),
        }
    }

    /// `pending -> approved`: reserve stock, then update the request
    async fn approve(
        &self,
        request: LoanRequest,
        equipment: EquipmentRecord,
    ) -> AppResult<LoanRequest> {
        self.repository
            .ledger
            .reserve(request.equipment_id, request.quantity)
            .await?;

        let updated = self
            .repository
            .requests
            .set_status(request.id, RequestStatus::Approved)
            .await
            .map_err(|e| partial_write("approval status update", e))?;

        self.notifications
            .notify(NotificationType::RequestApproved, &updated, &equipment)
            .await
            .map_err(|e| partial_write("approval notification", e))?;

        Ok(updated)
    }

    /// `pending|approved -> rejected`: release stock if it was reserved,
    /// write a rejection entry, notify
    async fn reject(
        &self,
        request: LoanRequest,
        equipment: EquipmentRecord,
        was_reserved: bool,
        processed_by: Option<String>,
    ) -> AppResult<LoanRequest> {
        let mut wrote_something = false;
        if was_reserved {
            self.repository
                .ledger
                .release(request.equipment_id, request.quantity)
                .await?;
            wrote_something = true;
        }

        let updated = self
            .repository
            .requests
            .set_status(request.id, RequestStatus::Rejected)
            .await
            .map_err(|e| {
                if wrote_something {
                    partial_write("rejection status update", e)
                } else {
                    e
                }
            })?;

        self.repository
            .history
            .append(&rejection_entry(&updated, processed_by))
            .await
            .map_err(|e| partial_write("rejection history entry", e))?;

        self.notifications
            .notify(NotificationType::RequestRejected, &updated, &equipment)
            .await
            .map_err(|e| partial_write("rejection notification", e))?;

        Ok(updated)
    }

    /// `approved -> released`: no ledger change, the stock was reserved at
    /// approval; record a release entry
    async fn release(
        &self,
        request: LoanRequest,
        processed_by: Option<String>,
    ) -> AppResult<LoanRequest> {
        let updated = self
            .repository
            .requests
            .set_status(request.id, RequestStatus::Released)
            .await?;

        let released_date = updated.released_at.unwrap_or(updated.updated_at);
        self.repository
            .history
            .append(&NewHistoryEntry {
                request_id: updated.id,
                equipment_id: updated.equipment_id,
                category_id: updated.category_id,
                entry_type: HistoryEntryType::Release,
                status: RequestStatus::Released.to_string(),
                quantity: updated.quantity,
                timestamp: released_date,
                released_date: Some(released_date),
                return_date: None,
                date_to_return: updated.date_to_return,
                condition: None,
                return_details: None,
                processed_by,
            })
            .await
            .map_err(|e| partial_write("release history entry", e))?;

        Ok(updated)
    }

    /// `rejected -> approved`: re-reserve stock and retract the rejection
    /// entry, as if the rejection never happened
    async fn undo_rejection(
        &self,
        request: LoanRequest,
        equipment: EquipmentRecord,
    ) -> AppResult<LoanRequest> {
        self.repository
            .ledger
            .reserve(request.equipment_id, request.quantity)
            .await?;

        self.repository
            .history
            .retract_rejection(request.id)
            .await
            .map_err(|e| partial_write("rejection retraction", e))?;

        let updated = self
            .repository
            .requests
            .set_status(request.id, RequestStatus::Approved)
            .await
            .map_err(|e| partial_write("approval status update", e))?;

        self.notifications
            .notify(NotificationType::RequestApproved, &updated, &equipment)
            .await
            .map_err(|e| partial_write("approval notification", e))?;

        Ok(updated)
    }
}

fn rejection_entry(request: &LoanRequest, processed_by: Option<String>) -> NewHistoryEntry {
    NewHistoryEntry {
        request_id: request.id,
        equipment_id: request.equipment_id,
        category_id: request.category_id,
        entry_type: HistoryEntryType::Rejection,
        status: RequestStatus::Rejected.to_string(),
        quantity: request.quantity,
        timestamp: Utc::now(),
        released_date: None,
        return_date: None,
        date_to_return: request.date_to_return,
        condition: None,
        return_details: None,
        processed_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::history::HistoryFilter;
    use crate::repository::{MockNotificationSink, Repository};
    use crate::services::testing::{approved_request, fixture, pending_request};
    use std::sync::Arc;

    #[tokio::test]
    async fn approving_reserves_stock() {
        let fx = fixture(5).await;
        let request = pending_request(&fx, 3).await;

        let updated = fx
            .engine
            .transition(request.id, RequestStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Approved);
        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 3);
        assert_eq!(equipment.available(), 2);
    }

    #[tokio::test]
    async fn approval_fails_without_enough_stock() {
        let fx = fixture(5).await;
        let first = pending_request(&fx, 3).await;
        fx.engine
            .transition(first.id, RequestStatus::Approved, None)
            .await
            .unwrap();

        let second = pending_request(&fx, 3).await;
        let err = fx
            .engine
            .transition(second.id, RequestStatus::Approved, None)
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 3);
        let request = fx.repository.requests.get(second.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn rejecting_an_approved_request_frees_stock_and_logs_it() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 3).await;

        fx.engine
            .transition(request.id, RequestStatus::Rejected, None)
            .await
            .unwrap();

        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 0);

        let entries = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, HistoryEntryType::Rejection);
    }

    #[tokio::test]
    async fn undoing_a_rejection_restores_ledger_and_retracts_the_entry() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 3).await;
        fx.engine
            .transition(request.id, RequestStatus::Rejected, None)
            .await
            .unwrap();

        let updated = fx
            .engine
            .transition(request.id, RequestStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Approved);
        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 3);

        let rejections = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                entry_type: Some(HistoryEntryType::Rejection),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(rejections.is_empty());
    }

    #[tokio::test]
    async fn rejecting_a_pending_request_leaves_the_ledger_alone() {
        let fx = fixture(5).await;
        let request = pending_request(&fx, 2).await;

        fx.engine
            .transition(request.id, RequestStatus::Rejected, None)
            .await
            .unwrap();

        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 0);
        let entries = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, HistoryEntryType::Rejection);
    }

    #[tokio::test]
    async fn releasing_writes_a_release_entry_without_touching_the_ledger() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 3).await;

        fx.engine
            .transition(request.id, RequestStatus::Released, None)
            .await
            .unwrap();

        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 3);
        let entries = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                entry_type: Some(HistoryEntryType::Release),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn unknown_edges_are_rejected_before_any_write() {
        let fx = fixture(5).await;
        let request = pending_request(&fx, 1).await;

        let err = fx
            .engine
            .transition(request.id, RequestStatus::Released, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 0);
        let request = fx.repository.requests.get(request.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn missing_request_is_reported() {
        let fx = fixture(5).await;
        let err = fx
            .engine
            .transition(999, RequestStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RequestNotFound(999)));
    }

    #[tokio::test]
    async fn notification_failure_after_approval_surfaces_as_partial_write() {
        let fx = fixture(5).await;
        let request = pending_request(&fx, 2).await;

        // Same stores, but a sink that refuses every write.
        let mut sink = MockNotificationSink::new();
        sink.expect_push()
            .returning(|_| Err(AppError::Internal("sink down".to_string())));
        let repository = Repository {
            notifications: Arc::new(sink),
            ..fx.repository.clone()
        };
        let engine = TransitionEngine::new(
            repository.clone(),
            NotificationService::new(repository.notifications.clone()),
        );

        let err = engine
            .transition(request.id, RequestStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PartialWrite { .. }));

        // The ledger and status writes happened and stay in place.
        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 2);
        let request = fx.repository.requests.get(request.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
    }
}
