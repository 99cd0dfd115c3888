//! Handlers for material requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::error::CoreError;
use roofline_core::material::{self, MaterialAggregate};
use roofline_core::types::DbId;
use roofline_db::models::material_request::{CreateMaterialRequest, UpdateMaterialRequest};
use roofline_db::repositories::MaterialRequestRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::workflow::view::MaterialRequestView;

/// Response for the per-project listing: the requests plus the fulfillment
/// summary the dashboard renders.
#[derive(Serialize)]
pub struct MaterialListResponse {
    pub requests: Vec<MaterialRequestView>,
    pub aggregate: MaterialAggregate,
}

/// POST /api/v1/projects/{project_id}/material-requests
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateMaterialRequest>,
) -> AppResult<(StatusCode, Json<MaterialRequestView>)> {
    let request = state
        .workflow
        .create_material_request(project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/v1/projects/{project_id}/material-requests
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<MaterialListResponse>> {
    let (requests, aggregate) = state.workflow.list_material_requests(project_id).await?;
    Ok(Json(MaterialListResponse {
        requests,
        aggregate,
    }))
}

/// GET /api/v1/material-requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MaterialRequestView>> {
    let request = MaterialRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaterialRequest",
            id,
        }))?;
    let needs_estimate = material::needs_estimate(request.status()?, request.estimated_delivery);
    Ok(Json(MaterialRequestView {
        needs_estimate,
        request,
    }))
}

/// PATCH /api/v1/material-requests/{id}
///
/// Lifecycle events (`approve`, `order`, `deliver`, `cancel`) and plain field
/// edits travel in the same body; re-applying the event that produced the
/// current state is a no-op.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMaterialRequest>,
) -> AppResult<Json<MaterialRequestView>> {
    let request = state.workflow.update_material_request(id, input).await?;
    Ok(Json(request))
}
