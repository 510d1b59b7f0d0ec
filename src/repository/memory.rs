//! In-memory store implementation
//!
//! Backs every store trait with plain maps behind one mutex. Used by the
//! unit tests and by tooling that needs the lifecycle without Postgres.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::{EquipmentStore, HistoryLog, InventoryLedger, NotificationSink, RequestStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, EquipmentRecord, UpdateEquipment},
        history::{HistoryEntry, HistoryFilter, NewHistoryEntry},
        notification::{NewNotification, Notification},
        request::{LoanRequest, NewLoanRequest, RequestFilter},
        NotificationType, RequestStatus,
    },
};

#[derive(Default)]
struct Inner {
    requests: HashMap<i32, LoanRequest>,
    equipment: HashMap<i32, EquipmentRecord>,
    history: Vec<HistoryEntry>,
    notifications: Vec<Notification>,
    next_request_id: i32,
    next_equipment_id: i32,
    next_history_id: i32,
    next_notification_id: i32,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn get(&self, id: i32) -> AppResult<LoanRequest> {
        self.lock()
            .requests
            .get(&id)
            .cloned()
            .ok_or(AppError::RequestNotFound(id))
    }

    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<LoanRequest>> {
        let inner = self.lock();
        let mut rows: Vec<LoanRequest> = inner
            .requests
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.requester_id.map_or(true, |u| r.requester_id == u))
            .filter(|r| filter.equipment_id.map_or(true, |e| r.equipment_id == e))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(rows)
    }

    async fn by_batch(&self, batch_id: Uuid) -> AppResult<Vec<LoanRequest>> {
        let inner = self.lock();
        let mut rows: Vec<LoanRequest> = inner
            .requests
            .values()
            .filter(|r| r.batch_id == Some(batch_id))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn insert(&self, request: &NewLoanRequest) -> AppResult<LoanRequest> {
        let mut inner = self.lock();
        inner.next_request_id += 1;
        let now = Utc::now();
        let row = LoanRequest {
            id: inner.next_request_id,
            equipment_id: request.equipment_id,
            category_id: request.category_id,
            requester_id: request.requester_id,
            quantity: request.quantity,
            status: RequestStatus::Pending,
            batch_id: request.batch_id,
            batch_size: request.batch_size,
            requested_at: now,
            updated_at: now,
            released_at: None,
            date_to_be_used: request.date_to_be_used,
            date_to_return: request.date_to_return,
        };
        inner.requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn set_status(&self, id: i32, status: RequestStatus) -> AppResult<LoanRequest> {
        let mut inner = self.lock();
        let row = inner
            .requests
            .get_mut(&id)
            .ok_or(AppError::RequestNotFound(id))?;
        let now = Utc::now();
        row.status = status;
        row.updated_at = now;
        if status == RequestStatus::Released {
            row.released_at = Some(now);
        }
        Ok(row.clone())
    }

    async fn remove(&self, id: i32) -> AppResult<()> {
        self.lock()
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::RequestNotFound(id))
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanRequest>> {
        let inner = self.lock();
        let mut rows: Vec<LoanRequest> = inner
            .requests
            .values()
            .filter(|r| {
                matches!(
                    r.status,
                    RequestStatus::Released | RequestStatus::InProgress
                ) && r.date_to_return.map_or(false, |d| d < now)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date_to_return);
        Ok(rows)
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn get(&self, id: i32) -> AppResult<EquipmentRecord> {
        self.lock()
            .equipment
            .get(&id)
            .cloned()
            .ok_or(AppError::EquipmentNotFound(id))
    }

    async fn list(&self) -> AppResult<Vec<EquipmentRecord>> {
        let inner = self.lock();
        let mut rows: Vec<EquipmentRecord> = inner.equipment.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create(&self, data: &CreateEquipment) -> AppResult<EquipmentRecord> {
        let mut inner = self.lock();
        inner.next_equipment_id += 1;
        let row = EquipmentRecord {
            id: inner.next_equipment_id,
            category_id: data.category_id,
            name: data.name.clone(),
            lab_id: data.lab_id.clone(),
            quantity: data.quantity,
            quantity_borrowed: 0,
            notes: data.notes.clone(),
            crea_date: Some(Utc::now()),
            modif_date: None,
        };
        inner.equipment.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<EquipmentRecord> {
        let mut inner = self.lock();
        let row = inner
            .equipment
            .get_mut(&id)
            .ok_or(AppError::EquipmentNotFound(id))?;
        if let Some(quantity) = data.quantity {
            if quantity < row.quantity_borrowed {
                return Err(AppError::Validation(format!(
                    "Quantity cannot drop below the {} units currently borrowed",
                    row.quantity_borrowed
                )));
            }
            row.quantity = quantity;
        }
        if let Some(category_id) = data.category_id {
            row.category_id = category_id;
        }
        if let Some(ref name) = data.name {
            row.name = name.clone();
        }
        if let Some(ref lab_id) = data.lab_id {
            row.lab_id = Some(lab_id.clone());
        }
        if let Some(ref notes) = data.notes {
            row.notes = Some(notes.clone());
        }
        row.modif_date = Some(Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.lock()
            .equipment
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::EquipmentNotFound(id))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for MemoryStore {
    async fn available(&self, equipment_id: i32) -> AppResult<i32> {
        let inner = self.lock();
        let row = inner
            .equipment
            .get(&equipment_id)
            .ok_or(AppError::EquipmentNotFound(equipment_id))?;
        Ok(row.available())
    }

    async fn reserve(&self, equipment_id: i32, qty: i32) -> AppResult<()> {
        let mut inner = self.lock();
        let row = inner
            .equipment
            .get_mut(&equipment_id)
            .ok_or(AppError::EquipmentNotFound(equipment_id))?;
        if row.available() < qty {
            return Err(AppError::InsufficientStock {
                equipment_id,
                requested: qty,
                available: row.available(),
            });
        }
        row.quantity_borrowed += qty;
        row.modif_date = Some(Utc::now());
        Ok(())
    }

    async fn release(&self, equipment_id: i32, qty: i32) -> AppResult<()> {
        let mut inner = self.lock();
        let row = inner
            .equipment
            .get_mut(&equipment_id)
            .ok_or(AppError::EquipmentNotFound(equipment_id))?;
        row.quantity_borrowed = (row.quantity_borrowed - qty).max(0);
        row.modif_date = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl HistoryLog for MemoryStore {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry> {
        let mut inner = self.lock();
        inner.next_history_id += 1;
        let row = HistoryEntry {
            id: inner.next_history_id,
            request_id: entry.request_id,
            equipment_id: entry.equipment_id,
            category_id: entry.category_id,
            entry_type: entry.entry_type,
            status: entry.status.clone(),
            quantity: entry.quantity,
            timestamp: entry.timestamp,
            released_date: entry.released_date,
            return_date: entry.return_date,
            date_to_return: entry.date_to_return,
            condition: entry.condition.clone(),
            return_details: entry.return_details.clone().map(Json),
            processed_by: entry.processed_by.clone(),
        };
        inner.history.push(row.clone());
        Ok(row)
    }

    async fn retract_rejection(&self, request_id: i32) -> AppResult<u64> {
        let mut inner = self.lock();
        let before = inner.history.len();
        inner.history.retain(|e| {
            !(e.request_id == request_id
                && e.entry_type == crate::models::HistoryEntryType::Rejection)
        });
        Ok((before - inner.history.len()) as u64)
    }

    async fn has_release_entry(&self, request_id: i32) -> AppResult<bool> {
        let inner = self.lock();
        Ok(inner.history.iter().any(|e| {
            e.request_id == request_id
                && e.entry_type == crate::models::HistoryEntryType::Release
        }))
    }

    async fn list(&self, filter: &HistoryFilter) -> AppResult<Vec<HistoryEntry>> {
        let inner = self.lock();
        let mut rows: Vec<HistoryEntry> = inner
            .history
            .iter()
            .filter(|e| filter.request_id.map_or(true, |id| e.request_id == id))
            .filter(|e| filter.equipment_id.map_or(true, |id| e.equipment_id == id))
            .filter(|e| filter.entry_type.map_or(true, |t| e.entry_type == t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn push(&self, notification: &NewNotification) -> AppResult<()> {
        let mut inner = self.lock();
        inner.next_notification_id += 1;
        let row = Notification {
            id: inner.next_notification_id,
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            message: notification.message.clone(),
            lab_id: notification.lab_id.clone(),
            recipient_user_id: notification.recipient_user_id,
            metadata: Json(notification.metadata.clone()),
            created_at: Utc::now(),
        };
        inner.notifications.push(row);
        Ok(())
    }

    async fn has_overdue_notice(&self, request_id: i32) -> AppResult<bool> {
        let inner = self.lock();
        Ok(inner.notifications.iter().any(|n| {
            n.notification_type == NotificationType::EquipmentOverdue
                && n.metadata.request_id == Some(request_id)
        }))
    }
}

impl MemoryStore {
    /// Snapshot of written notifications, newest last (test helper)
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_stock(stock: i32) -> (MemoryStore, i32) {
        let store = MemoryStore::new();
        let equipment = store
            .create(&CreateEquipment {
                category_id: 1,
                name: "Signal generator".to_string(),
                lab_id: None,
                quantity: stock,
                notes: None,
            })
            .await
            .unwrap();
        (store, equipment.id)
    }

    #[tokio::test]
    async fn releasing_more_than_borrowed_clamps_at_zero() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(id, 2).await.unwrap();

        store.release(id, 5).await.unwrap();

        let row = EquipmentStore::get(&store, id).await.unwrap();
        assert_eq!(row.quantity_borrowed, 0);
        assert_eq!(row.available(), 5);
    }

    #[tokio::test]
    async fn retracting_without_rejection_entries_removes_nothing() {
        let store = MemoryStore::new();
        let removed = store.retract_rejection(42).await.unwrap();
        assert_eq!(removed, 0);
    }
}
