//! History log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;

use super::enums::HistoryEntryType;
use super::request::ReturnDetails;

/// Append-only audit record of a release, return, or rejection event
///
/// Entries are immutable once written; the only exception is the retraction
/// of rejection entries when a rejected request is moved back to approved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    pub id: i32,
    pub request_id: i32,
    pub equipment_id: i32,
    pub category_id: i32,
    pub entry_type: HistoryEntryType,
    /// Human label of the status the request reached
    pub status: String,
    pub quantity: i32,
    pub timestamp: DateTime<Utc>,
    pub released_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    /// Expected-return deadline copied from the request for lateness analysis
    pub date_to_return: Option<DateTime<Utc>>,
    /// Human-readable condition description
    pub condition: Option<String>,
    #[schema(value_type = Option<ReturnDetails>)]
    pub return_details: Option<Json<ReturnDetails>>,
    pub processed_by: Option<String>,
}

/// Fields for appending a new history entry
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub request_id: i32,
    pub equipment_id: i32,
    pub category_id: i32,
    pub entry_type: HistoryEntryType,
    pub status: String,
    pub quantity: i32,
    pub timestamp: DateTime<Utc>,
    pub released_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub date_to_return: Option<DateTime<Utc>>,
    pub condition: Option<String>,
    pub return_details: Option<ReturnDetails>,
    pub processed_by: Option<String>,
}

/// Listing filter for history entries
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
pub struct HistoryFilter {
    pub request_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub entry_type: Option<HistoryEntryType>,
}
