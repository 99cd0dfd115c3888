//! Handlers for the `/teams` reference data.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofline_core::error::CoreError;
use roofline_core::team::{self, Team};
use roofline_db::models::team::{CreateTeam, TeamRow, UpdateTeam};
use roofline_db::repositories::{ProjectRepo, TeamRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/teams
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<TeamRow>)> {
    team::validate_team(&Team {
        code: input.code.clone(),
        name: input.name.clone(),
        color: input.color.clone(),
    })?;
    let created = TeamRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/teams
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<TeamRow>>> {
    let teams = TeamRepo::list(&state.pool).await?;
    Ok(Json(teams))
}

/// GET /api/v1/teams/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<TeamRow>> {
    let team = TeamRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Team",
            key: code,
        }))?;
    Ok(Json(team))
}

/// PUT /api/v1/teams/{code}
pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<UpdateTeam>,
) -> AppResult<Json<TeamRow>> {
    if let Some(color) = input.color.as_deref() {
        team::validate_color(color)?;
    }
    let updated = TeamRepo::update(&state.pool, &code, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Team",
            key: code,
        }))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/teams/{code}
///
/// Refused while any project still references the code, scheduled or not.
pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    let referencing = ProjectRepo::count_by_team(&state.pool, &code).await?;
    if referencing > 0 {
        return Err(AppError::Conflict(format!(
            "Team '{code}' is still referenced by {referencing} project(s)"
        )));
    }

    let deleted = TeamRepo::delete(&state.pool, &code).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Team",
            key: code,
        }))
    }
}
