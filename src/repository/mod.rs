//! Storage layer for the request lifecycle
//!
//! The transition engine never talks to the backing store directly: every
//! collection is reached through one of the traits below, so the Postgres
//! implementation can be swapped for the in-memory one in tests.

pub mod equipment;
pub mod history;
pub mod memory;
pub mod notifications;
pub mod requests;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, EquipmentRecord, UpdateEquipment},
        history::{HistoryEntry, HistoryFilter, NewHistoryEntry},
        notification::NewNotification,
        request::{LoanRequest, NewLoanRequest, RequestFilter},
        RequestStatus,
    },
};

/// Active borrow requests keyed by id
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<LoanRequest>;
    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<LoanRequest>>;
    /// Resolve every request sharing a batch identifier
    async fn by_batch(&self, batch_id: Uuid) -> AppResult<Vec<LoanRequest>>;
    async fn insert(&self, request: &NewLoanRequest) -> AppResult<LoanRequest>;
    /// Update the status, stamping `updated_at` and, on release, `released_at`
    async fn set_status(&self, id: i32, status: RequestStatus) -> AppResult<LoanRequest>;
    /// Delete a request (terminal return or pending cancellation)
    async fn remove(&self, id: i32) -> AppResult<()>;
    /// Released or in-progress requests whose return deadline has passed
    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanRequest>>;
}

/// Equipment records: CRUD surface used by equipment management
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<EquipmentRecord>;
    async fn list(&self) -> AppResult<Vec<EquipmentRecord>>;
    async fn create(&self, data: &CreateEquipment) -> AppResult<EquipmentRecord>;
    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<EquipmentRecord>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    /// Cheap connectivity probe for readiness reporting
    async fn ping(&self) -> AppResult<()>;
}

/// The borrowed-quantity counter
///
/// Only the transition engine and the return processor may call `reserve`
/// and `release`; nothing else writes `quantity_borrowed`.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    async fn available(&self, equipment_id: i32) -> AppResult<i32>;
    /// Atomically increment `quantity_borrowed` by `qty` if enough stock is
    /// available, otherwise fail with `InsufficientStock` and change nothing.
    async fn reserve(&self, equipment_id: i32, qty: i32) -> AppResult<()>;
    /// Decrement `quantity_borrowed` by `qty`, clamped at zero.
    async fn release(&self, equipment_id: i32, qty: i32) -> AppResult<()>;
}

/// Append-only audit trail
#[async_trait]
pub trait HistoryLog: Send + Sync {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry>;
    /// Delete every rejection entry for the request; zero matches is fine.
    /// Returns the number of entries removed.
    async fn retract_rejection(&self, request_id: i32) -> AppResult<u64>;
    /// Whether a release entry already exists for the request
    async fn has_release_entry(&self, request_id: i32) -> AppResult<bool>;
    /// Entries sorted by timestamp descending
    async fn list(&self, filter: &HistoryFilter) -> AppResult<Vec<HistoryEntry>>;
}

/// Write-only notification outbox
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn push(&self, notification: &NewNotification) -> AppResult<()>;
    /// Whether an overdue notice was already written for the request
    async fn has_overdue_notice(&self, request_id: i32) -> AppResult<bool>;
}

/// Bundle of store handles injected into the services
#[derive(Clone)]
pub struct Repository {
    pub requests: Arc<dyn RequestStore>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub ledger: Arc<dyn InventoryLedger>,
    pub history: Arc<dyn HistoryLog>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl Repository {
    /// Create a repository backed by Postgres
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let equipment = Arc::new(equipment::PgEquipmentStore::new(pool.clone()));
        Self {
            requests: Arc::new(requests::PgRequestStore::new(pool.clone())),
            equipment: equipment.clone(),
            ledger: equipment,
            history: Arc::new(history::PgHistoryLog::new(pool.clone())),
            notifications: Arc::new(notifications::PgNotificationSink::new(pool)),
        }
    }

    /// Create a repository backed by in-memory maps (tests, local tooling)
    pub fn in_memory() -> Self {
        Self::from_memory_store(Arc::new(memory::MemoryStore::new()))
    }

    /// Wrap an existing in-memory store, keeping a handle to it for inspection
    pub fn from_memory_store(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            requests: store.clone(),
            equipment: store.clone(),
            ledger: store.clone(),
            history: store.clone(),
            notifications: store,
        }
    }
}
