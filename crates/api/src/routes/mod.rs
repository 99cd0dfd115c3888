pub mod health;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                 list, create
/// /projects/{id}                            full aggregate view
/// /projects/{id}/events                     apply workflow event (POST)
/// /projects/{id}/phase/{phase}              phase shortcut (PATCH)
/// /projects/{id}/status                     override shortcut (PATCH)
/// /projects/{id}/material-requests          list, create
///
/// /material-requests/{id}                   get, update (PATCH)
///
/// /planning/tasks?start=..&end=..&team=..   planner window (GET)
/// /planning/add-project                     place on the timeline (POST)
/// /planning/reassign-team                   change crew (POST)
/// /planning/remove-project/{id}             take off the timeline (DELETE)
///
/// /teams                                    list, create
/// /teams/{code}                             get, update, delete
///
/// /events                                   recent activity feed (GET)
/// ```
///
/// The phase/status/planning shortcuts build the corresponding workflow
/// event and go through the same facade as `/projects/{id}/events`.
pub fn api_routes() -> Router<AppState> {
    let project_routes = Router::new()
        .route(
            "/",
            get(handlers::project::list).post(handlers::project::create),
        )
        .route("/{id}", get(handlers::project::get_by_id))
        .route("/{id}/events", post(handlers::project::apply_event))
        .route("/{id}/phase/{phase}", patch(handlers::project::update_phase))
        .route("/{id}/status", patch(handlers::project::update_status))
        .route(
            "/{id}/material-requests",
            get(handlers::material::list_by_project).post(handlers::material::create),
        );

    let material_routes = Router::new().route(
        "/{id}",
        get(handlers::material::get_by_id).patch(handlers::material::update),
    );

    let team_routes = Router::new()
        .route("/", get(handlers::team::list).post(handlers::team::create))
        .route(
            "/{code}",
            get(handlers::team::get_by_code)
                .put(handlers::team::update)
                .delete(handlers::team::delete),
        );

    let planning_routes = Router::new()
        .route("/tasks", get(handlers::planning::planner))
        .route("/add-project", post(handlers::planning::add_project))
        .route("/reassign-team", post(handlers::planning::reassign_team))
        .route(
            "/remove-project/{id}",
            delete(handlers::planning::remove_project),
        );

    Router::new()
        .nest("/projects", project_routes)
        .nest("/material-requests", material_routes)
        .nest("/teams", team_routes)
        .nest("/planning", planning_routes)
        .route("/events", get(handlers::event::list_recent))
}
