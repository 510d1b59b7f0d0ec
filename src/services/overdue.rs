//! Overdue equipment scanner
//!
//! Periodically finds released requests past their return deadline and
//! emits one overdue notification per request.

use std::time::Duration;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::NotificationType,
    repository::Repository,
};

use super::notifications::NotificationService;

#[derive(Clone)]
pub struct OverdueScanner {
    repository: Repository,
    notifications: NotificationService,
    interval: Duration,
}

impl OverdueScanner {
    pub fn new(
        repository: Repository,
        notifications: NotificationService,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            notifications,
            interval,
        }
    }

    /// Run the scan loop until the process exits
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                match self.scan_once().await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "emitted overdue notifications"),
                    Err(e) => tracing::error!(error = %e, "overdue scan failed"),
                }
            }
        })
    }

    /// One pass over the overdue requests; returns how many notices were written
    pub async fn scan_once(&self) -> AppResult<usize> {
        let overdue = self.repository.requests.list_overdue(Utc::now()).await?;
        let mut emitted = 0;
        for request in overdue {
            if self
                .repository
                .notifications
                .has_overdue_notice(request.id)
                .await?
            {
                continue;
            }
            let equipment = self.repository.equipment.get(request.equipment_id).await?;
            self.notifications
                .notify(NotificationType::EquipmentOverdue, &request, &equipment)
                .await?;
            emitted += 1;
        }
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestStatus;
    use crate::services::testing::{approved_request, fixture, overdue_request};

    #[tokio::test]
    async fn scan_notifies_each_overdue_request_once() {
        let fx = fixture(5).await;
        let request = overdue_request(&fx, 2).await;

        let scanner = OverdueScanner::new(
            fx.repository.clone(),
            fx.notifications.clone(),
            Duration::from_secs(3600),
        );

        assert_eq!(scanner.scan_once().await.unwrap(), 1);
        // Second pass finds the existing notice and writes nothing new.
        assert_eq!(scanner.scan_once().await.unwrap(), 0);

        let notices: Vec<_> = fx
            .store
            .notifications()
            .into_iter()
            .filter(|n| {
                n.notification_type == crate::models::NotificationType::EquipmentOverdue
            })
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].metadata.request_id, Some(request.id));
    }

    #[tokio::test]
    async fn requests_within_their_deadline_are_left_alone() {
        let fx = fixture(5).await;
        let request = approved_request(&fx, 1).await;
        fx.engine
            .transition(request.id, RequestStatus::Released, None)
            .await
            .unwrap();

        let scanner = OverdueScanner::new(
            fx.repository.clone(),
            fx.notifications.clone(),
            Duration::from_secs(3600),
        );
        assert_eq!(scanner.scan_once().await.unwrap(), 0);
    }
}
