//! Material request entity model and DTOs.

use roofline_core::error::CoreError;
use roofline_core::material::{MaterialItem, MaterialPriority, MaterialStatus};
use roofline_core::types::{DbId, PlanDate, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `material_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaterialRequest {
    pub id: DbId,
    pub project_id: DbId,
    /// JSONB array of `{name, quantity, unit, unit_cost}`.
    pub items: serde_json::Value,
    pub status: String,
    pub priority: String,
    pub estimated_delivery: Option<PlanDate>,
    pub actual_delivery: Option<PlanDate>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaterialRequest {
    /// The typed lifecycle status.
    pub fn status(&self) -> Result<MaterialStatus, CoreError> {
        MaterialStatus::from_str_value(&self.status)
    }

    /// The typed line items.
    pub fn items(&self) -> Result<Vec<MaterialItem>, CoreError> {
        serde_json::from_value(self.items.clone())
            .map_err(|e| CoreError::Internal(format!("Malformed items payload: {e}")))
    }
}

/// DTO for creating a material request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaterialRequest {
    pub items: Vec<MaterialItem>,
    pub priority: Option<MaterialPriority>,
    pub estimated_delivery: Option<PlanDate>,
    pub notes: Option<String>,
}

/// DTO for the partial update of a request. All fields optional; `event`
/// drives the status transition, the rest are plain field edits.
///
/// The nullable columns are double-wrapped so a PATCH can distinguish an
/// omitted field (outer `None`, keep the stored value) from an explicit
/// `null` (inner `None`, clear it).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMaterialRequest {
    /// Optional claim of the owning project; a mismatch is treated as
    /// not-found rather than leaking another project's request.
    pub project_id: Option<DbId>,
    pub event: Option<roofline_core::material::MaterialEvent>,
    pub priority: Option<MaterialPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_delivery: Option<Option<PlanDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_delivery: Option<Option<PlanDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`, so the `default`
/// path only fires for fields absent from the body.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
