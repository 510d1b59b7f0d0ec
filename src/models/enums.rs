//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a borrow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Released,
    Rejected,
    InProgress,
    Returned,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Released => "Released",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Returned => "Returned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// HistoryEntryType
// ---------------------------------------------------------------------------

/// Kind of audit record in the history log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "history_entry_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HistoryEntryType {
    Release,
    Return,
    Rejection,
}

impl std::fmt::Display for HistoryEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HistoryEntryType::Release => "Release",
            HistoryEntryType::Return => "Return",
            HistoryEntryType::Rejection => "Rejection",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Notification kinds emitted by the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewRequest,
    RequestApproved,
    RequestRejected,
    EquipmentReturned,
    EquipmentOverdue,
}

// ---------------------------------------------------------------------------
// ReturnCondition
// ---------------------------------------------------------------------------

/// Condition reported when equipment comes back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    Good,
    Damaged,
    Lost,
    Missing,
    #[serde(other)]
    Other,
}

impl ReturnCondition {
    /// Human-readable label recorded in the history log
    pub fn label(&self) -> &'static str {
        match self {
            ReturnCondition::Good => "Returned in good condition",
            ReturnCondition::Damaged => "Returned damaged",
            ReturnCondition::Lost | ReturnCondition::Missing => "Item lost/missing",
            ReturnCondition::Other => "Returned",
        }
    }
}

// ---------------------------------------------------------------------------
// BatchPolicy
// ---------------------------------------------------------------------------

/// How a batch transition treats member failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Apply members sequentially, stop at the first failure, keep earlier results
    #[default]
    BestEffort,
    /// Pre-validate every member and refuse the whole batch if any would fail
    AllOrNothing,
}
