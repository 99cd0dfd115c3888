//! Repository for the `projects` table.

use roofline_core::phase::{PhaseName, PhaseState};
use roofline_core::timeline::TimelineSlot;
use roofline_core::types::{DbId, PlanDate};
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, calculation_id, address, customer_name, customer_phone, \
     scaffolding_status, scaffolding_completed_at, \
     removal_status, removal_completed_at, \
     material_status, material_completed_at, \
     invoicing_status, invoicing_completed_at, invoice_reference, \
     team_code, planned_start, planned_end, status_override, \
     created_at, updated_at";

/// SQL expression for the effective overall status: the stored override when
/// present, otherwise derived from the number of completed phases.
const EFFECTIVE_STATUS: &str = "COALESCE(status_override, CASE \
     (scaffolding_status = 'completed')::int + \
     (removal_status = 'completed')::int + \
     (material_status = 'completed')::int + \
     (invoicing_status = 'completed')::int \
     WHEN 0 THEN 'pending' WHEN 4 THEN 'completed' ELSE 'in_progress' END)";

/// Provides CRUD and workflow write operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with all phases pending, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (calculation_id, address, customer_name, customer_phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.calculation_id)
            .bind(&input.address)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects matching the filter, most recently created first.
    ///
    /// The status filter applies to the *effective* overall status, i.e. the
    /// stored override when present, otherwise the phase-derived value.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::text IS NULL OR team_code = $1)
               AND ($2::text IS NULL OR {EFFECTIVE_STATUS} = $2)
               AND ($3::text IS NULL
                    OR customer_name ILIKE '%' || $3 || '%'
                    OR address ILIKE '%' || $3 || '%')
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&filter.team)
            .bind(&filter.status)
            .bind(&filter.q)
            .fetch_all(pool)
            .await
    }

    /// Write one phase's state. For the invoicing phase an invoice reference
    /// may be attached in the same statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_phase(
        pool: &PgPool,
        id: DbId,
        phase: PhaseName,
        state: &PhaseState,
        invoice_reference: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        // Column names come from the fixed phase enum, never from input.
        let prefix = phase.as_str();
        let query = if phase == PhaseName::Invoicing {
            format!(
                "UPDATE projects SET
                    invoicing_status = $2,
                    invoicing_completed_at = $3,
                    invoice_reference = COALESCE($4, invoice_reference),
                    updated_at = NOW()
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            )
        } else {
            format!(
                "UPDATE projects SET
                    {prefix}_status = $2,
                    {prefix}_completed_at = $3,
                    updated_at = NOW()
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            )
        };

        let mut q = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(state.status.as_str())
            .bind(state.completed_date);
        if phase == PhaseName::Invoicing {
            q = q.bind(invoice_reference);
        }
        q.fetch_optional(pool).await
    }

    /// Place (or move) a project on the timeline.
    pub async fn set_timeline(
        pool: &PgPool,
        id: DbId,
        start: PlanDate,
        end: PlanDate,
        team_code: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                planned_start = $2,
                planned_end = $3,
                team_code = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(team_code)
            .fetch_optional(pool)
            .await
    }

    /// Attach or detach a team without touching the dates.
    pub async fn set_team(
        pool: &PgPool,
        id: DbId,
        team_code: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET team_code = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(team_code)
            .fetch_optional(pool)
            .await
    }

    /// Remove the project from the planner. The project itself remains.
    pub async fn clear_timeline(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                planned_start = NULL,
                planned_end = NULL,
                team_code = NULL,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the explicit overall-status override.
    pub async fn set_status_override(
        pool: &PgPool,
        id: DbId,
        status_override: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_override = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status_override)
            .fetch_optional(pool)
            .await
    }

    /// All active slots held by one team, for double-booking checks.
    pub async fn team_slots(
        pool: &PgPool,
        team_code: &str,
    ) -> Result<Vec<TimelineSlot>, sqlx::Error> {
        let rows: Vec<(DbId, Option<String>, PlanDate, PlanDate)> = sqlx::query_as(
            "SELECT id, team_code, planned_start, planned_end FROM projects
             WHERE team_code = $1 AND planned_start IS NOT NULL AND planned_end IS NOT NULL",
        )
        .bind(team_code)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(project_id, team_code, start, end)| TimelineSlot {
                project_id,
                team_code,
                start,
                end,
            })
            .collect())
    }

    /// Projects whose slot intersects the window, ordered by start date then
    /// project id. Drives the planner view.
    pub async fn slots_in_range(
        pool: &PgPool,
        start: PlanDate,
        end: PlanDate,
        team_code: Option<&str>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE planned_start IS NOT NULL AND planned_end IS NOT NULL
               AND planned_start < $2 AND $1 < planned_end
               AND ($3::text IS NULL OR team_code = $3)
             ORDER BY planned_start, id"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(start)
            .bind(end)
            .bind(team_code)
            .fetch_all(pool)
            .await
    }

    /// Number of projects referencing a team code (any state).
    pub async fn count_by_team(pool: &PgPool, team_code: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE team_code = $1")
            .bind(team_code)
            .fetch_one(pool)
            .await
    }
}
