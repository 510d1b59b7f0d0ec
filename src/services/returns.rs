//! Return processing
//!
//! Finalizes a released request: frees the reserved stock, writes the
//! matching history entries, removes the request from the active store and
//! triggers the returned notification.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        history::NewHistoryEntry,
        request::ReturnDetails,
        HistoryEntryType, NotificationType, RequestStatus,
    },
    repository::Repository,
};

use super::{notifications::NotificationService, transitions::partial_write};

#[derive(Clone)]
pub struct ReturnService {
    repository: Repository,
    notifications: NotificationService,
}

impl ReturnService {
    pub fn new(repository: Repository, notifications: NotificationService) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Process the return of a released or in-progress request
    ///
    /// Returning is terminal: the request row is deleted and survives only
    /// through its history entries.
    pub async fn process_return(
        &self,
        request_id: i32,
        details: ReturnDetails,
    ) -> AppResult<()> {
        let request = self.repository.requests.get(request_id).await?;
        if !matches!(
            request.status,
            RequestStatus::Released | RequestStatus::InProgress
        ) {
            return Err(AppError::InvalidTransition {
                from: request.status,
                to: RequestStatus::Returned,
            });
        }
        let equipment = self.repository.equipment.get(request.equipment_id).await?;

        self.repository
            .ledger
            .release(request.equipment_id, request.quantity)
            .await?;

        let now = Utc::now();
        let released_date = request.released_at.unwrap_or(request.updated_at);

        // A released request should already carry a release entry; write a
        // backdated one only when the original release path missed it.
        let has_release = self
            .repository
            .history
            .has_release_entry(request.id)
            .await
            .map_err(|e| partial_write("release entry lookup", e))?;
        if !has_release {
            self.repository
                .history
                .append(&NewHistoryEntry {
                    request_id: request.id,
                    equipment_id: request.equipment_id,
                    category_id: request.category_id,
                    entry_type: HistoryEntryType::Release,
                    status: RequestStatus::Released.to_string(),
                    quantity: request.quantity,
                    timestamp: released_date,
                    released_date: Some(released_date),
                    return_date: None,
                    date_to_return: request.date_to_return,
                    condition: None,
                    return_details: None,
                    processed_by: details.processed_by.clone(),
                })
                .await
                .map_err(|e| partial_write("backdated release entry", e))?;
        }

        self.repository
            .history
            .append(&NewHistoryEntry {
                request_id: request.id,
                equipment_id: request.equipment_id,
                category_id: request.category_id,
                entry_type: HistoryEntryType::Return,
                status: RequestStatus::Returned.to_string(),
                quantity: request.quantity,
                timestamp: now,
                released_date: Some(released_date),
                return_date: Some(now),
                date_to_return: request.date_to_return,
                condition: Some(details.condition.label().to_string()),
                return_details: Some(details.clone()),
                processed_by: details.processed_by.clone(),
            })
            .await
            .map_err(|e| partial_write("return history entry", e))?;

        self.repository
            .requests
            .remove(request.id)
            .await
            .map_err(|e| partial_write("request removal", e))?;

        self.notifications
            .notify(NotificationType::EquipmentReturned, &request, &equipment)
            .await
            .map_err(|e| partial_write("return notification", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{history::HistoryFilter, ReturnCondition};
    use crate::services::testing::{approved_request, fixture};

    fn details(condition: ReturnCondition) -> ReturnDetails {
        ReturnDetails {
            condition,
            delay_reason: None,
            notes: None,
            processed_by: Some("manager-1".to_string()),
        }
    }

    #[tokio::test]
    async fn returning_frees_stock_and_finalizes_the_request() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 3).await;
        fx.engine
            .transition(request.id, RequestStatus::Released, None)
            .await
            .unwrap();

        fx.returns
            .process_return(request.id, details(ReturnCondition::Damaged))
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
        let releases = entries
            .iter()
            .filter(|e| e.entry_type == HistoryEntryType::Release)
            .count();
        let returns: Vec<_> = entries
            .iter()
            .filter(|e| e.entry_type == HistoryEntryType::Return)
            .collect();
        assert_eq!(releases, 1);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].condition.as_deref(), Some("Returned damaged"));
        assert_eq!(returns[0].processed_by.as_deref(), Some("manager-1"));

        let err = fx.repository.requests.get(request.id).await.unwrap_err();
        assert!(matches!(err, AppError::RequestNotFound(_)));
    }

    #[tokio::test]
    async fn return_works_from_in_progress_too() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 2).await;
        fx.engine
            .transition(request.id, RequestStatus::Released, None)
            .await
            .unwrap();
        fx.engine
            .transition(request.id, RequestStatus::InProgress, None)
            .await
            .unwrap();

        fx.returns
            .process_return(request.id, details(ReturnCondition::Good))
            .await
            .unwrap();

        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 0);
    }

    #[tokio::test]
    async fn backdated_release_entry_is_written_when_missing() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 2).await;
        // Skip the normal release bookkeeping by driving the store directly.
        fx.repository
            .requests
            .set_status(request.id, RequestStatus::Released)
            .await
            .unwrap();

        fx.returns
            .process_return(request.id, details(ReturnCondition::Lost))
            .await
            .unwrap();

        let releases = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                entry_type: Some(HistoryEntryType::Release),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(releases.len(), 1);

        let returns = fx
            .repository
            .history
            .list(&HistoryFilter {
                request_id: Some(request.id),
                entry_type: Some(HistoryEntryType::Return),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(returns[0].condition.as_deref(), Some("Item lost/missing"));
    }

    #[tokio::test]
    async fn returning_an_unreleased_request_is_refused() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 2).await;

        let err = fx
            .returns
            .process_return(request.id, details(ReturnCondition::Good))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        // Nothing moved.
        let equipment = fx.repository.equipment.get(fx.equipment_id).await.unwrap();
        assert_eq!(equipment.quantity_borrowed, 2);
        assert!(fx.repository.requests.get(request.id).await.is_ok());
    }
}
