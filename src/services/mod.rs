//! Business logic services

pub mod batch;
pub mod equipment;
pub mod history;
pub mod notifications;
pub mod overdue;
pub mod requests;
pub mod returns;
pub mod transitions;

#[cfg(test)]
pub(crate) mod testing;

use crate::{models::BatchPolicy, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub requests: requests::RequestsService,
    pub transitions: transitions::TransitionEngine,
    pub returns: returns::ReturnService,
    pub batch: batch::BatchService,
    pub equipment: equipment::EquipmentService,
    pub history: history::HistoryService,
    pub notifications: notifications::NotificationService,
}

impl Services {
    /// Create all services against the given repository
    pub fn new(repository: Repository, default_batch_policy: BatchPolicy) -> Self {
        let notifications =
            notifications::NotificationService::new(repository.notifications.clone());
        let transitions =
            transitions::TransitionEngine::new(repository.clone(), notifications.clone());
        Self {
            requests: requests::RequestsService::new(repository.clone(), notifications.clone()),
            returns: returns::ReturnService::new(repository.clone(), notifications.clone()),
            batch: batch::BatchService::new(
                repository.clone(),
                transitions.clone(),
                default_batch_policy,
            ),
            equipment: equipment::EquipmentService::new(repository.clone()),
            history: history::HistoryService::new(repository),
            transitions,
            notifications,
        }
    }
}
