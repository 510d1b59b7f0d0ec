//! Equipment management service

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, EquipmentAvailability, EquipmentRecord, UpdateEquipment},
        request::RequestFilter,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<EquipmentRecord>> {
        self.repository.equipment.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<EquipmentRecord> {
        self.repository.equipment.get(id).await
    }

    pub async fn create(&self, data: CreateEquipment) -> AppResult<EquipmentRecord> {
        self.repository.equipment.create(&data).await
    }

    pub async fn update(&self, id: i32, data: UpdateEquipment) -> AppResult<EquipmentRecord> {
        self.repository.equipment.update(id, &data).await
    }

    /// Delete equipment with no outstanding reservations or requests
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let record = self.repository.equipment.get(id).await?;
        if record.quantity_borrowed > 0 {
            return Err(AppError::Conflict(format!(
                "Equipment {} still has {} borrowed units",
                id, record.quantity_borrowed
            )));
        }
        let open = self
            .repository
            .requests
            .list(&RequestFilter {
                equipment_id: Some(id),
                ..Default::default()
            })
            .await?;
        if !open.is_empty() {
            return Err(AppError::Conflict(format!(
                "Equipment {} still has {} open requests",
                id,
                open.len()
            )));
        }
        self.repository.equipment.delete(id).await
    }

    pub async fn availability(&self, id: i32) -> AppResult<EquipmentAvailability> {
        let record = self.repository.equipment.get(id).await?;
        Ok(EquipmentAvailability {
            equipment_id: record.id,
            quantity: record.quantity,
            quantity_borrowed: record.quantity_borrowed,
            available: record.available(),
        })
    }

    /// Probe the backing store for readiness reporting
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.equipment.ping().await
    }
}
