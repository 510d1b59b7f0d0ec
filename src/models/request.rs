//! Borrow request model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{RequestStatus, ReturnCondition};

/// Active borrow request
///
/// A request in the `returned` state never appears here: returning is
/// terminal and removes the row, leaving only history entries behind.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRequest {
    pub id: i32,
    pub equipment_id: i32,
    pub category_id: i32,
    pub requester_id: i32,
    /// Units requested, always >= 1
    pub quantity: i32,
    pub status: RequestStatus,
    /// Group key shared by requests submitted together
    pub batch_id: Option<Uuid>,
    pub batch_size: Option<i32>,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the request transitions to `released`
    pub released_at: Option<DateTime<Utc>>,
    pub date_to_be_used: Option<DateTime<Utc>>,
    /// Expected-return deadline
    pub date_to_return: Option<DateTime<Utc>>,
}

/// Fields for inserting a new request into the store
#[derive(Debug, Clone)]
pub struct NewLoanRequest {
    pub equipment_id: i32,
    pub category_id: i32,
    pub requester_id: i32,
    pub quantity: i32,
    pub batch_id: Option<Uuid>,
    pub batch_size: Option<i32>,
    pub date_to_be_used: Option<DateTime<Utc>>,
    pub date_to_return: Option<DateTime<Utc>>,
}

/// Create request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub equipment_id: i32,
    pub requester_id: i32,
    /// Units requested (defaults to 1)
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub date_to_be_used: Option<DateTime<Utc>>,
    pub date_to_return: Option<DateTime<Utc>>,
}

/// Create a batch of requests submitted together
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatchRequest {
    pub requester_id: i32,
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub items: Vec<BatchItem>,
    pub date_to_be_used: Option<DateTime<Utc>>,
    pub date_to_return: Option<DateTime<Utc>>,
}

/// One member of a batch submission
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchItem {
    pub equipment_id: i32,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

/// Listing filter for active requests
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub requester_id: Option<i32>,
    pub equipment_id: Option<i32>,
}

/// Return-condition metadata attached to a returned request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnDetails {
    pub condition: ReturnCondition,
    pub delay_reason: Option<String>,
    pub notes: Option<String>,
    /// Identity of whoever processed the return
    pub processed_by: Option<String>,
}
