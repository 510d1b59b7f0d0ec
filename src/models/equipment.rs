//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentRecord {
    pub id: i32,
    pub category_id: i32,
    /// Equipment name / description
    pub name: String,
    /// Laboratory this equipment belongs to (scoping is applied externally)
    pub lab_id: Option<String>,
    /// Total units in stock
    pub quantity: i32,
    /// Units currently reserved by approved or released requests
    pub quantity_borrowed: i32,
    pub notes: Option<String>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl EquipmentRecord {
    /// Units still available for approval
    pub fn available(&self) -> i32 {
        self.quantity - self.quantity_borrowed
    }
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    pub category_id: i32,
    #[validate(length(min = 1))]
    pub name: String,
    pub lab_id: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub category_id: Option<i32>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub lab_id: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

/// Availability snapshot for one equipment record
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentAvailability {
    pub equipment_id: i32,
    pub quantity: i32,
    pub quantity_borrowed: i32,
    pub available: i32,
}
