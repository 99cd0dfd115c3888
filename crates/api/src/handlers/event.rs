//! Handler for the persisted domain event feed.

use axum::extract::{Query, State};
use axum::Json;
use roofline_db::models::event::EventRow;
use roofline_db::repositories::EventRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Pagination parameters for the event feed.
#[derive(Debug, Deserialize)]
pub struct EventFeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/events
///
/// Recent workflow activity, newest first. Backed by the append-only event
/// log the persistence subscriber maintains.
pub async fn list_recent(
    State(state): State<AppState>,
    Query(query): Query<EventFeedQuery>,
) -> AppResult<Json<Vec<EventRow>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let events = EventRepo::list_recent(&state.pool, limit, offset).await?;
    Ok(Json(events))
}
