//! Integration tests for planner placement, conflicts, and the planner view.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, delete, get, post_json, seed_team};
use sqlx::PgPool;

async fn schedule(
    app: axum::Router,
    id: i64,
    start: &str,
    end: &str,
    team: Option<&str>,
    force: bool,
) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/planning/add-project",
        serde_json::json!({
            "project_id": id,
            "start_date": start,
            "end_date": end,
            "team_code": team,
            "force": force,
        }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn scheduling_places_the_project(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    let response = schedule(app, id, "2025-07-01", "2025-07-10", Some("team-a"), false).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["applied"], true);
    assert!(json["conflict"].is_null());
    assert_eq!(json["project"]["timeline_slot"]["start"], "2025-07-01");
    assert_eq!(json["project"]["timeline_slot"]["end"], "2025-07-10");
    assert_eq!(json["project"]["team"]["code"], "team-a");
    assert_eq!(json["project"]["team"]["color"], "#3fa7d6");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn scheduling_without_a_team_never_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;

    for project in [&first, &second] {
        let id = project["id"].as_i64().unwrap();
        let response = schedule(app.clone(), id, "2025-07-01", "2025-07-10", None, false).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn start_after_end_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    let response = schedule(app, id, "2025-07-10", "2025-07-01", None, false).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_team_is_a_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    let response = schedule(app, id, "2025-07-01", "2025-07-10", Some("ghost"), false).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Double-booking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn double_booking_is_rejected_with_the_conflict(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let response = schedule(
        app.clone(),
        first_id,
        "2025-07-01",
        "2025-07-10",
        Some("team-a"),
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = schedule(
        app.clone(),
        second_id,
        "2025-07-05",
        "2025-07-08",
        Some("team-a"),
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["applied"], false);
    assert_eq!(json["conflict"]["team_code"], "team-a");
    assert_eq!(json["conflict"]["conflicts"][0]["project_id"], first_id);
    // The rejected placement left the project untouched.
    assert!(json["project"]["timeline_slot"].is_null());

    let response = get(app, &format!("/api/v1/projects/{second_id}")).await;
    let json = body_json(response).await;
    assert!(json["timeline_slot"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn forced_placement_applies_and_reports_the_conflict(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    schedule(
        app.clone(),
        first_id,
        "2025-07-01",
        "2025-07-10",
        Some("team-a"),
        false,
    )
    .await;

    let response = schedule(
        app,
        second_id,
        "2025-07-05",
        "2025-07-08",
        Some("team-a"),
        true,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["applied"], true);
    assert_eq!(json["conflict"]["team_code"], "team-a");
    assert_eq!(json["project"]["timeline_slot"]["start"], "2025-07-05");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn back_to_back_slots_do_not_conflict(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;

    schedule(
        app.clone(),
        first["id"].as_i64().unwrap(),
        "2025-07-01",
        "2025-07-05",
        Some("team-a"),
        false,
    )
    .await;

    // Half-open ranges: the next job may start the day the previous ends.
    let response = schedule(
        app,
        second["id"].as_i64().unwrap(),
        "2025-07-05",
        "2025-07-09",
        Some("team-a"),
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn moving_a_project_does_not_conflict_with_itself(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    schedule(
        app.clone(),
        id,
        "2025-07-01",
        "2025-07-10",
        Some("team-a"),
        false,
    )
    .await;

    let response = schedule(app, id, "2025-07-02", "2025-07-09", Some("team-a"), false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["applied"], true);
}

// ---------------------------------------------------------------------------
// Reassignment and removal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn reassigning_into_a_busy_team_is_rejected(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    seed_team(&pool, "team-b", "Team B", "#ee6352").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;
    let second_id = second["id"].as_i64().unwrap();

    schedule(
        app.clone(),
        first["id"].as_i64().unwrap(),
        "2025-07-01",
        "2025-07-10",
        Some("team-a"),
        false,
    )
    .await;
    schedule(
        app.clone(),
        second_id,
        "2025-07-05",
        "2025-07-08",
        Some("team-b"),
        false,
    )
    .await;

    let response = post_json(
        app,
        "/api/v1/planning/reassign-team",
        serde_json::json!({ "project_id": second_id, "team_code": "team-a" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["applied"], false);
    assert_eq!(json["project"]["team"]["code"], "team-b");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn removal_clears_the_slot_and_team(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    schedule(
        app.clone(),
        id,
        "2025-07-01",
        "2025-07-10",
        Some("team-a"),
        false,
    )
    .await;

    let response = delete(app.clone(), &format!("/api/v1/planning/remove-project/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/projects/{id}")).await;
    let json = body_json(response).await;
    assert!(json["timeline_slot"].is_null());
    assert!(json["team"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn removing_an_unknown_project_is_a_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = delete(app, "/api/v1/planning/remove-project/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn event_entry_point_places_projects_too(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    let app = common::build_test_app(pool);
    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/projects/{id}/events"),
        serde_json::json!({
            "type": "schedule",
            "start_date": "2025-07-01",
            "end_date": "2025-07-10",
            "team_code": "team-a",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["project"]["timeline_slot"]["start"], "2025-07-01");
}

// ---------------------------------------------------------------------------
// Planner view
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn planner_window_returns_intersecting_bars_in_order(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    seed_team(&pool, "team-b", "Team B", "#ee6352").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;
    let third = create_project(app.clone(), "Cecilia Holm").await;

    schedule(
        app.clone(),
        second["id"].as_i64().unwrap(),
        "2025-07-03",
        "2025-07-08",
        Some("team-b"),
        false,
    )
    .await;
    schedule(
        app.clone(),
        first["id"].as_i64().unwrap(),
        "2025-07-01",
        "2025-07-05",
        Some("team-a"),
        false,
    )
    .await;
    // Outside the window below.
    schedule(
        app.clone(),
        third["id"].as_i64().unwrap(),
        "2025-08-01",
        "2025-08-05",
        Some("team-a"),
        false,
    )
    .await;

    let response = get(app, "/api/v1/planning/tasks?start=2025-07-01&end=2025-07-31").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let bars = json.as_array().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0]["customer_name"], "Anna Lund");
    assert_eq!(bars[0]["team"]["color"], "#3fa7d6");
    assert_eq!(bars[1]["customer_name"], "Bertil Ek");
    assert_eq!(bars[1]["progress"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn planner_window_filters_by_team(pool: PgPool) {
    seed_team(&pool, "team-a", "Team A", "#3fa7d6").await;
    seed_team(&pool, "team-b", "Team B", "#ee6352").await;
    let app = common::build_test_app(pool);
    let first = create_project(app.clone(), "Anna Lund").await;
    let second = create_project(app.clone(), "Bertil Ek").await;

    schedule(
        app.clone(),
        first["id"].as_i64().unwrap(),
        "2025-07-01",
        "2025-07-05",
        Some("team-a"),
        false,
    )
    .await;
    schedule(
        app.clone(),
        second["id"].as_i64().unwrap(),
        "2025-07-03",
        "2025-07-08",
        Some("team-b"),
        false,
    )
    .await;

    let response = get(
        app,
        "/api/v1/planning/tasks?start=2025-07-01&end=2025-07-31&team=team-b",
    )
    .await;
    let json = body_json(response).await;
    let bars = json.as_array().unwrap();
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0]["customer_name"], "Bertil Ek");
}
