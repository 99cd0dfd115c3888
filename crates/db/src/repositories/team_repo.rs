//! Repository for the `teams` table.

use sqlx::PgPool;

use crate::models::team::{CreateTeam, TeamRow, UpdateTeam};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, color, created_at, updated_at";

/// Provides CRUD operations for teams.
pub struct TeamRepo;

impl TeamRepo {
    /// Insert a new team, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTeam) -> Result<TeamRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO teams (code, name, color) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamRow>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a team by its code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<TeamRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE code = $1");
        sqlx::query_as::<_, TeamRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all teams ordered by code.
    pub async fn list(pool: &PgPool) -> Result<Vec<TeamRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams ORDER BY code");
        sqlx::query_as::<_, TeamRow>(&query).fetch_all(pool).await
    }

    /// Update a team's display data. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        code: &str,
        input: &UpdateTeam,
    ) -> Result<Option<TeamRow>, sqlx::Error> {
        let query = format!(
            "UPDATE teams SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                updated_at = NOW()
             WHERE code = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamRow>(&query)
            .bind(code)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a team by code. Returns `true` if a row was removed. Callers
    /// must check for referencing projects first.
    pub async fn delete(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE code = $1")
            .bind(code)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
