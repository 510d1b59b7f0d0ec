//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{CreateBatchRequest, CreateRequest, LoanRequest, RequestFilter, ReturnDetails},
        BatchPolicy, RequestStatus,
    },
    services::batch::BatchOutcome,
};

/// Status change body
#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target lifecycle status
    pub status: RequestStatus,
    /// Identity of whoever processed the change
    pub processed_by: Option<String>,
}

/// Batch status change body
#[derive(Deserialize, ToSchema)]
pub struct UpdateBatchStatusRequest {
    pub status: RequestStatus,
    /// Overrides the configured batch policy for this call
    pub policy: Option<BatchPolicy>,
    pub processed_by: Option<String>,
}

/// Transition response
#[derive(Serialize, ToSchema)]
pub struct TransitionResponse {
    pub id: i32,
    pub status: RequestStatus,
    pub message: String,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub id: i32,
    pub message: String,
}

/// List active borrow requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(RequestFilter),
    responses(
        (status = 200, description = "Active requests", body = Vec<LoanRequest>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    Query(filter): Query<RequestFilter>,
) -> AppResult<Json<Vec<LoanRequest>>> {
    let requests = state.services.requests.list(filter).await?;
    Ok(Json(requests))
}

/// Get one borrow request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = LoanRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRequest>> {
    let request = state.services.requests.get(id).await?;
    Ok(Json(request))
}

/// Submit a new borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = LoanRequest),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    Json(body): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<LoanRequest>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = state.services.requests.create(body).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Submit a batch of borrow requests sharing one batch identifier
#[utoipa::path(
    post,
    path = "/requests/batch",
    tag = "requests",
    request_body = CreateBatchRequest,
    responses(
        (status = 201, description = "Requests created", body = Vec<LoanRequest>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_batch(
    State(state): State<crate::AppState>,
    Json(body): Json<CreateBatchRequest>,
) -> AppResult<(StatusCode, Json<Vec<LoanRequest>>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let requests = state.services.requests.create_batch(body).await?;
    Ok((StatusCode::CREATED, Json(requests)))
}

/// Change the status of a borrow request
#[utoipa::path(
    post,
    path = "/requests/{id}/status",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = TransitionResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Insufficient stock"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let updated = state
        .services
        .transitions
        .transition(id, body.status, body.processed_by)
        .await?;

    Ok(Json(TransitionResponse {
        id: updated.id,
        status: updated.status,
        message: format!("Request {} is now {}", updated.id, updated.status),
    }))
}

/// Cancel a pending borrow request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.requests.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return borrowed equipment
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ReturnDetails,
    responses(
        (status = 200, description = "Equipment returned", body = ReturnResponse),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request is not released")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(details): Json<ReturnDetails>,
) -> AppResult<Json<ReturnResponse>> {
    state.services.returns.process_return(id, details).await?;
    Ok(Json(ReturnResponse {
        id,
        message: "Equipment returned".to_string(),
    }))
}

/// Change the status of every request in a batch
#[utoipa::path(
    post,
    path = "/batches/{batch_id}/status",
    tag = "requests",
    params(("batch_id" = Uuid, Path, description = "Batch ID")),
    request_body = UpdateBatchStatusRequest,
    responses(
        (status = 200, description = "Batch transitioned", body = BatchOutcome),
        (status = 404, description = "Batch not found"),
        (status = 422, description = "Batch stopped before completion")
    )
)]
pub async fn update_batch_status(
    State(state): State<crate::AppState>,
    Path(batch_id): Path<Uuid>,
    Json(body): Json<UpdateBatchStatusRequest>,
) -> AppResult<Json<BatchOutcome>> {
    let outcome = state
        .services
        .batch
        .apply_to_batch(batch_id, body.status, body.policy, body.processed_by)
        .await?;
    Ok(Json(outcome))
}
