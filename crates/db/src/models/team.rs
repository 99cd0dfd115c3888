//! Team entity model and DTOs.

use roofline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamRow {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeam {
    pub code: String,
    pub name: String,
    pub color: String,
}

/// DTO for updating a team's display data. The code itself is immutable
/// because projects reference it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub color: Option<String>,
}
