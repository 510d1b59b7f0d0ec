//! Equipment management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        CreateEquipment, EquipmentAvailability, EquipmentRecord, UpdateEquipment,
    },
};

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment records", body = Vec<EquipmentRecord>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<EquipmentRecord>>> {
    let records = state.services.equipment.list().await?;
    Ok(Json(records))
}

/// Get one equipment record
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentRecord),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentRecord>> {
    let record = state.services.equipment.get(id).await?;
    Ok(Json(record))
}

/// Create an equipment record
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentRecord),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    Json(body): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<EquipmentRecord>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state.services.equipment.create(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update an equipment record
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentRecord),
        (status = 400, description = "Quantity below borrowed units"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateEquipment>,
) -> AppResult<Json<EquipmentRecord>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state.services.equipment.update(id, body).await?;
    Ok(Json(record))
}

/// Delete an equipment record
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment still has borrowed units")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Availability snapshot for one equipment record
#[utoipa::path(
    get,
    path = "/equipment/{id}/availability",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Availability", body = EquipmentAvailability),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentAvailability>> {
    let availability = state.services.equipment.availability(id).await?;
    Ok(Json(availability))
}
