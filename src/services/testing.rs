//! Shared fixtures for the service tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    models::{
        equipment::CreateEquipment,
        request::{LoanRequest, NewLoanRequest},
        BatchPolicy, RequestStatus,
    },
    repository::{memory::MemoryStore, Repository},
};

use super::{
    batch::BatchService, notifications::NotificationService, requests::RequestsService,
    returns::ReturnService, transitions::TransitionEngine,
};

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub repository: Repository,
    pub notifications: NotificationService,
    pub engine: TransitionEngine,
    pub returns: ReturnService,
    pub batch: BatchService,
    pub requests: RequestsService,
    pub equipment_id: i32,
}

/// An in-memory repository with one equipment record holding `stock` units
pub(crate) async fn fixture(stock: i32) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let repository = Repository::from_memory_store(store.clone());
    let equipment = repository
        .equipment
        .create(&CreateEquipment {
            category_id: 1,
            name: "Oscilloscope".to_string(),
            lab_id: Some("lab-1".to_string()),
            quantity: stock,
            notes: None,
        })
        .await
        .unwrap();

    let notifications = NotificationService::new(repository.notifications.clone());
    let engine = TransitionEngine::new(repository.clone(), notifications.clone());
    let returns = ReturnService::new(repository.clone(), notifications.clone());
    let batch = BatchService::new(
        repository.clone(),
        engine.clone(),
        BatchPolicy::BestEffort,
    );
    let requests = RequestsService::new(repository.clone(), notifications.clone());

    Fixture {
        store,
        repository,
        notifications,
        engine,
        returns,
        batch,
        requests,
        equipment_id: equipment.id,
    }
}

fn new_request(fx: &Fixture, qty: i32) -> NewLoanRequest {
    NewLoanRequest {
        equipment_id: fx.equipment_id,
        category_id: 1,
        requester_id: 42,
        quantity: qty,
        batch_id: None,
        batch_size: None,
        date_to_be_used: None,
        date_to_return: Some(Utc::now() + Duration::days(7)),
    }
}

pub(crate) async fn pending_request(fx: &Fixture, qty: i32) -> LoanRequest {
    fx.repository
        .requests
        .insert(&new_request(fx, qty))
        .await
        .unwrap()
}

pub(crate) async fn approved_request(fx: &Fixture, qty: i32) -> LoanRequest {
    let request = pending_request(fx, qty).await;
    fx.engine
        .transition(request.id, RequestStatus::Approved, None)
        .await
        .unwrap()
}

/// A released request whose return deadline has already passed
pub(crate) async fn overdue_request(fx: &Fixture, qty: i32) -> LoanRequest {
    let request = fx
        .repository
        .requests
        .insert(&NewLoanRequest {
            date_to_return: Some(Utc::now() - Duration::hours(2)),
            ..new_request(fx, qty)
        })
        .await
        .unwrap();
    fx.engine
        .transition(request.id, RequestStatus::Approved, None)
        .await
        .unwrap();
    fx.engine
        .transition(request.id, RequestStatus::Released, None)
        .await
        .unwrap()
}

/// Insert pending requests sharing one batch id, one per quantity given
pub(crate) async fn batch_of(fx: &Fixture, quantities: &[i32]) -> Uuid {
    let batch_id = Uuid::new_v4();
    for &qty in quantities {
        fx.repository
            .requests
            .insert(&NewLoanRequest {
                batch_id: Some(batch_id),
                batch_size: Some(quantities.len() as i32),
                ..new_request(fx, qty)
            })
            .await
            .unwrap();
    }
    batch_id
}
