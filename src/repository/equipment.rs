//! Postgres equipment store and inventory ledger

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use super::{EquipmentStore, InventoryLedger};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, EquipmentRecord, UpdateEquipment},
};

#[derive(Clone)]
pub struct PgEquipmentStore {
    pool: Pool<Postgres>,
}

impl PgEquipmentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for PgEquipmentStore {
    async fn get(&self, id: i32) -> AppResult<EquipmentRecord> {
        sqlx::query_as::<_, EquipmentRecord>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::EquipmentNotFound(id))
    }

    async fn list(&self) -> AppResult<Vec<EquipmentRecord>> {
        let rows = sqlx::query_as::<_, EquipmentRecord>("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, data: &CreateEquipment) -> AppResult<EquipmentRecord> {
        let row = sqlx::query_as::<_, EquipmentRecord>(
            r#"
            INSERT INTO equipment (category_id, name, lab_id, quantity, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.category_id)
        .bind(&data.name)
        .bind(&data.lab_id)
        .bind(data.quantity)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<EquipmentRecord> {
        // Total quantity may never drop below what is currently borrowed.
        let row = sqlx::query_as::<_, EquipmentRecord>(
            r#"
            UPDATE equipment
            SET category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                lab_id = COALESCE($4, lab_id),
                quantity = COALESCE($5, quantity),
                notes = COALESCE($6, notes),
                modif_date = NOW()
            WHERE id = $1
              AND COALESCE($5, quantity) >= quantity_borrowed
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.category_id)
        .bind(&data.name)
        .bind(&data.lab_id)
        .bind(data.quantity)
        .bind(&data.notes)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(record) => Ok(record),
            None => {
                // Distinguish a missing record from a refused quantity change.
                let current = self.get(id).await?;
                Err(AppError::Validation(format!(
                    "Quantity cannot drop below the {} units currently borrowed",
                    current.quantity_borrowed
                )))
            }
        }
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::EquipmentNotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for PgEquipmentStore {
    async fn available(&self, equipment_id: i32) -> AppResult<i32> {
        let record = EquipmentStore::get(self, equipment_id).await?;
        Ok(record.available())
    }

    async fn reserve(&self, equipment_id: i32, qty: i32) -> AppResult<()> {
        // Guard and increment in a single conditional statement so two
        // concurrent approvals cannot both pass a stale availability check.
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET quantity_borrowed = quantity_borrowed + $2, modif_date = NOW()
            WHERE id = $1 AND quantity - quantity_borrowed >= $2
            "#,
        )
        .bind(equipment_id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let row = sqlx::query("SELECT quantity, quantity_borrowed FROM equipment WHERE id = $1")
                .bind(equipment_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(AppError::EquipmentNotFound(equipment_id))?;
            let quantity: i32 = row.get("quantity");
            let borrowed: i32 = row.get("quantity_borrowed");
            return Err(AppError::InsufficientStock {
                equipment_id,
                requested: qty,
                available: quantity - borrowed,
            });
        }
        Ok(())
    }

    async fn release(&self, equipment_id: i32, qty: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET quantity_borrowed = GREATEST(quantity_borrowed - $2, 0), modif_date = NOW()
            WHERE id = $1
            "#,
        )
        .bind(equipment_id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::EquipmentNotFound(equipment_id));
        }
        Ok(())
    }
}
