//! Integration tests for team configuration endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, delete, get, post_json, put_json};
use sqlx::PgPool;

async fn create_team(app: axum::Router, code: &str, name: &str, color: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/teams",
        serde_json::json!({ "code": code, "name": name, "color": color }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_fetch_a_team(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app, "/api/v1/teams/team-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Team A");
    assert_eq!(json["color"], "#3fa7d6");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_code_and_color_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = create_team(app.clone(), "Team A", "Team A", "#3fa7d6").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = create_team(app, "team-a", "Team A", "3fa7d6").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_code_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);

    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;
    let response = create_team(app, "team-a", "Team A again", "#ee6352").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_is_ordered_by_code(pool: PgPool) {
    let app = common::build_test_app(pool);

    create_team(app.clone(), "team-b", "Team B", "#ee6352").await;
    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;

    let response = get(app, "/api/v1/teams").await;
    let json = body_json(response).await;
    let teams = json.as_array().unwrap();
    assert_eq!(teams[0]["code"], "team-a");
    assert_eq!(teams[1]["code"], "team-b");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_changes_display_data_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;

    let response = put_json(
        app,
        "/api/v1/teams/team-a",
        serde_json::json!({ "name": "Crew North", "color": "#59cd90" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], "team-a");
    assert_eq!(json["name"], "Crew North");
    assert_eq!(json["color"], "#59cd90");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_rejects_a_bad_color(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;

    let response = put_json(
        app,
        "/api/v1/teams/team-a",
        serde_json::json!({ "color": "blue" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_a_referenced_team_is_refused(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;

    let project = create_project(app.clone(), "Anna Lund").await;
    let id = project["id"].as_i64().unwrap();
    let response = post_json(
        app.clone(),
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

    let response = delete(app, "/api/v1/teams/team-a").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_an_unreferenced_team_succeeds(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_team(app.clone(), "team-a", "Team A", "#3fa7d6").await;

    let response = delete(app.clone(), "/api/v1/teams/team-a").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, "/api/v1/teams/team-a").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
