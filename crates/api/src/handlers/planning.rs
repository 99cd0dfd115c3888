//! Handlers for the shared planner: the window view and the placement
//! shortcuts that mirror drag-and-drop actions in a planning UI.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::types::{DbId, PlanDate};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;
use crate::workflow::view::PlannerTask;
use crate::workflow::{MutationOutcome, WorkflowEvent};

/// Query parameters for the planner window.
#[derive(Debug, Deserialize)]
pub struct PlannerWindow {
    pub start: PlanDate,
    pub end: PlanDate,
    /// Optional team code to narrow the view to one crew.
    pub team: Option<String>,
}

/// GET /api/v1/planning/tasks
///
/// All slots intersecting the window, ordered by start date then project id.
pub async fn planner(
    State(state): State<AppState>,
    Query(window): Query<PlannerWindow>,
) -> AppResult<Json<Vec<PlannerTask>>> {
    let tasks = state
        .workflow
        .planner_tasks(window.start, window.end, window.team.as_deref())
        .await?;
    Ok(Json(tasks))
}

/// Body of the placement route.
#[derive(Debug, Deserialize)]
pub struct AddProject {
    pub project_id: DbId,
    pub start_date: PlanDate,
    pub end_date: PlanDate,
    pub team_code: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// POST /api/v1/planning/add-project
///
/// Places a project on the timeline. A rejected double-booking answers 409
/// with the advisory conflict and the untouched project attached, same as
/// the event entry point.
pub async fn add_project(
    State(state): State<AppState>,
    Json(input): Json<AddProject>,
) -> AppResult<(StatusCode, Json<MutationOutcome>)> {
    let event = WorkflowEvent::Schedule {
        start_date: input.start_date,
        end_date: input.end_date,
        team_code: input.team_code,
        force: input.force,
    };
    let outcome = state.workflow.apply_event(input.project_id, event).await?;
    let status = if outcome.applied {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    Ok((status, Json(outcome)))
}

/// Body of the crew-change route.
#[derive(Debug, Deserialize)]
pub struct ReassignTeam {
    pub project_id: DbId,
    pub team_code: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// POST /api/v1/planning/reassign-team
pub async fn reassign_team(
    State(state): State<AppState>,
    Json(input): Json<ReassignTeam>,
) -> AppResult<(StatusCode, Json<MutationOutcome>)> {
    let event = WorkflowEvent::ReassignTeam {
        team_code: input.team_code,
        force: input.force,
    };
    let outcome = state.workflow.apply_event(input.project_id, event).await?;
    let status = if outcome.applied {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    Ok((status, Json(outcome)))
}

/// DELETE /api/v1/planning/remove-project/{id}
pub async fn remove_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .workflow
        .apply_event(id, WorkflowEvent::RemoveFromTimeline)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
