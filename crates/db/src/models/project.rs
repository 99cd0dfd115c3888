//! Project entity model and DTOs.
//!
//! The project row denormalizes the phase ledger and timeline placement so a
//! single read serves the dashboard and the planner. Conversion helpers map
//! the stored strings into the typed core enums.

use roofline_core::error::CoreError;
use roofline_core::phase::{OverallStatus, PhaseSet, PhaseState, PhaseStatus};
use roofline_core::timeline::TimelineSlot;
use roofline_core::types::{DbId, PlanDate, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub calculation_id: Option<DbId>,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,

    pub scaffolding_status: String,
    pub scaffolding_completed_at: Option<Timestamp>,
    pub removal_status: String,
    pub removal_completed_at: Option<Timestamp>,
    pub material_status: String,
    pub material_completed_at: Option<Timestamp>,
    pub invoicing_status: String,
    pub invoicing_completed_at: Option<Timestamp>,
    pub invoice_reference: Option<String>,

    pub team_code: Option<String>,
    pub planned_start: Option<PlanDate>,
    pub planned_end: Option<PlanDate>,

    pub status_override: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// The typed phase ledger of this row.
    pub fn phases(&self) -> Result<PhaseSet, CoreError> {
        Ok(PhaseSet {
            scaffolding: phase_state(&self.scaffolding_status, self.scaffolding_completed_at)?,
            removal: phase_state(&self.removal_status, self.removal_completed_at)?,
            material: phase_state(&self.material_status, self.material_completed_at)?,
            invoicing: phase_state(&self.invoicing_status, self.invoicing_completed_at)?,
        })
    }

    /// The typed status override, if any.
    pub fn status_override(&self) -> Result<Option<OverallStatus>, CoreError> {
        self.status_override
            .as_deref()
            .map(OverallStatus::from_str_value)
            .transpose()
    }

    /// The planner slot, when the project has been placed on the timeline.
    pub fn timeline_slot(&self) -> Option<TimelineSlot> {
        match (self.planned_start, self.planned_end) {
            (Some(start), Some(end)) => Some(TimelineSlot {
                project_id: self.id,
                team_code: self.team_code.clone(),
                start,
                end,
            }),
            _ => None,
        }
    }
}

fn phase_state(status: &str, completed_at: Option<Timestamp>) -> Result<PhaseState, CoreError> {
    Ok(PhaseState {
        status: PhaseStatus::from_str_value(status)?,
        completed_date: completed_at,
    })
}

/// DTO for creating a project from a converted deal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub calculation_id: Option<DbId>,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
}

/// Listing filter for the dashboard and planner views.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    /// Team code to filter by.
    pub team: Option<String>,
    /// Effective overall status (derived or overridden).
    pub status: Option<String>,
    /// Free-text search over customer name and address.
    pub q: Option<String>,
}
