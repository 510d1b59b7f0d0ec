//! Error types for the LabLoan server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::enums::RequestStatus;

/// Application error codes exposed in API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchRequest = 3,
    NoSuchEquipment = 4,
    InsufficientStock = 5,
    InvalidTransition = 6,
    PartialWrite = 7,
    BadValue = 8,
    Duplicate = 9,
    BatchAborted = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request {0} not found")]
    RequestNotFound(i32),

    #[error("Equipment {0} not found")]
    EquipmentNotFound(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Insufficient stock for equipment {equipment_id}: requested {requested}, available {available}")]
    InsufficientStock {
        equipment_id: i32,
        requested: i32,
        available: i32,
    },

    #[error("Batch stopped after {applied}/{total} requests: {reason}")]
    BatchAborted {
        applied: usize,
        total: usize,
        reason: String,
    },

    #[error("Partial write during {operation}: {detail}")]
    PartialWrite { operation: String, detail: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::RequestNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRequest, self.to_string())
            }
            AppError::EquipmentNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchEquipment, self.to_string())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRequest, msg.clone())
            }
            AppError::InvalidTransition { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InvalidTransition,
                self.to_string(),
            ),
            AppError::InsufficientStock { .. } => (
                StatusCode::CONFLICT,
                ErrorCode::InsufficientStock,
                self.to_string(),
            ),
            AppError::BatchAborted { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BatchAborted,
                self.to_string(),
            ),
            AppError::PartialWrite { .. } => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::PartialWrite,
                    self.to_string(),
                )
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
