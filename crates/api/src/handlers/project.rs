//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::phase::{OverallStatus, PhaseName, PhaseStatus};
use roofline_core::types::{DbId, Timestamp};
use roofline_db::models::project::{CreateProject, ProjectFilter};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;
use crate::workflow::view::{ProjectSummary, ProjectView};
use crate::workflow::{MutationOutcome, WorkflowEvent};

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<ProjectView>)> {
    let project = state.workflow.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<Vec<ProjectSummary>>> {
    let projects = state.workflow.list_projects(filter).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectView>> {
    let project = state.workflow.get_project(id).await?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/events
///
/// The single mutation entry point for one project aggregate. A rejected
/// double-booking answers 409 with the advisory conflict and the untouched
/// project attached, so the caller can confirm and retry with `force`.
pub async fn apply_event(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(event): Json<WorkflowEvent>,
) -> AppResult<(StatusCode, Json<MutationOutcome>)> {
    let outcome = state.workflow.apply_event(id, event).await?;
    let status = if outcome.applied {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    Ok((status, Json(outcome)))
}

/// Body of the phase shortcut route.
#[derive(Debug, Deserialize)]
pub struct PhasePatch {
    pub status: String,
    pub completed_date: Option<Timestamp>,
    pub invoice_reference: Option<String>,
}

/// PATCH /api/v1/projects/{id}/phase/{phase}
///
/// Shortcut for a phase workflow event with the phase taken from the path.
/// An unknown phase or status answers 409 like any other invalid transition.
pub async fn update_phase(
    State(state): State<AppState>,
    Path((id, phase)): Path<(DbId, String)>,
    Json(patch): Json<PhasePatch>,
) -> AppResult<Json<MutationOutcome>> {
    let event = WorkflowEvent::Phase {
        phase: PhaseName::from_str_value(&phase)?,
        status: PhaseStatus::from_str_value(&patch.status)?,
        completed_date: patch.completed_date,
        invoice_reference: patch.invoice_reference,
    };
    let outcome = state.workflow.apply_event(id, event).await?;
    Ok(Json(outcome))
}

/// Body of the status override route. A `null` override clears it and the
/// status falls back to the phase-derived value.
#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    #[serde(rename = "override")]
    pub status_override: Option<OverallStatus>,
}

/// PATCH /api/v1/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<StatusPatch>,
) -> AppResult<Json<MutationOutcome>> {
    let event = WorkflowEvent::StatusOverride {
        status: patch.status_override,
    };
    let outcome = state.workflow.apply_event(id, event).await?;
    Ok(Json(outcome))
}
