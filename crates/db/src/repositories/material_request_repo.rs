//! Repository for the `material_requests` table.

use roofline_core::material::{MaterialAggregate, MaterialStatus};
use roofline_core::types::{DbId, PlanDate};
use sqlx::PgPool;

use crate::models::material_request::{CreateMaterialRequest, MaterialRequest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, items, status, priority, \
     estimated_delivery, actual_delivery, notes, created_at, updated_at";

/// Provides CRUD operations for material requests.
pub struct MaterialRequestRepo;

impl MaterialRequestRepo {
    /// Insert a new request in `pending` state, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateMaterialRequest,
    ) -> Result<MaterialRequest, sqlx::Error> {
        let items = serde_json::to_value(&input.items)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let priority = input
            .priority
            .map(|p| p.as_str())
            .unwrap_or("normal");
        let query = format!(
            "INSERT INTO material_requests (project_id, items, priority, estimated_delivery, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaterialRequest>(&query)
            .bind(project_id)
            .bind(items)
            .bind(priority)
            .bind(input.estimated_delivery)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaterialRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM material_requests WHERE id = $1");
        sqlx::query_as::<_, MaterialRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all requests of one project, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MaterialRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM material_requests WHERE project_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, MaterialRequest>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Write the full post-update state of a request. The caller merges the
    /// PATCH body against the stored row first, so every column is set
    /// unconditionally; a `None` clears its column.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_update(
        pool: &PgPool,
        id: DbId,
        status: &str,
        priority: &str,
        estimated_delivery: Option<PlanDate>,
        actual_delivery: Option<PlanDate>,
        notes: Option<&str>,
    ) -> Result<Option<MaterialRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE material_requests SET
                status = $2,
                priority = $3,
                estimated_delivery = $4,
                actual_delivery = $5,
                notes = $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaterialRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(priority)
            .bind(estimated_delivery)
            .bind(actual_delivery)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Fulfillment summary for one project, computed from its request rows.
    pub async fn aggregate_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<MaterialAggregate, sqlx::Error> {
        let requests = Self::list_by_project(pool, project_id).await?;

        let mut agg = MaterialAggregate::default();
        for request in &requests {
            match request.status.as_str() {
                "pending" | "approved" => agg.open += 1,
                "ordered" => agg.ordered += 1,
                "delivered" => agg.delivered += 1,
                _ => {}
            }
            if request.status != MaterialStatus::Cancelled.as_str() {
                if let Ok(items) = request.items() {
                    agg.total_cost += roofline_core::material::total_cost(&items);
                }
            }
        }
        Ok(agg)
    }

    /// Statuses of all requests of one project, for the "all material
    /// delivered" signal.
    pub async fn statuses_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT status FROM material_requests WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
