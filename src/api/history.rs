//! History log endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::history::{HistoryEntry, HistoryFilter},
};

/// List history entries, newest first
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    params(HistoryFilter),
    responses(
        (status = 200, description = "History entries", body = Vec<HistoryEntry>)
    )
)]
pub async fn list_history(
    State(state): State<crate::AppState>,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.list(filter).await?;
    Ok(Json(entries))
}
