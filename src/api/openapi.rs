//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, history, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabLoan API",
        version = "1.0.0",
        description = "Laboratory Equipment Loan Tracker REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::create_batch,
        requests::update_status,
        requests::cancel_request,
        requests::return_request,
        requests::update_batch_status,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::get_availability,
        // History
        history::list_history,
    ),
    components(
        schemas(
            // Requests
            crate::models::request::LoanRequest,
            crate::models::request::CreateRequest,
            crate::models::request::CreateBatchRequest,
            crate::models::request::BatchItem,
            crate::models::request::ReturnDetails,
            crate::models::enums::RequestStatus,
            crate::models::enums::ReturnCondition,
            crate::models::enums::BatchPolicy,
            requests::UpdateStatusRequest,
            requests::UpdateBatchStatusRequest,
            requests::TransitionResponse,
            requests::ReturnResponse,
            crate::services::batch::BatchOutcome,
            // Equipment
            crate::models::equipment::EquipmentRecord,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentAvailability,
            // History
            crate::models::history::HistoryEntry,
            crate::models::enums::HistoryEntryType,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "requests", description = "Borrow request lifecycle"),
        (name = "equipment", description = "Equipment management"),
        (name = "history", description = "Audit history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
