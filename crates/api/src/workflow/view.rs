//! Read-side view types returned by the workflow facade.

use roofline_core::material::MaterialAggregate;
use roofline_core::phase::{OverallStatus, PhaseSet};
use roofline_core::timeline::TimelineSlot;
use roofline_core::types::{DbId, PlanDate, Timestamp};
use serde::{Deserialize, Serialize};

/// Team display data embedded in views so the UI never hard-codes colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub code: String,
    pub name: String,
    pub color: String,
}

/// The full aggregate view of one project: identity, phase ledger, planner
/// placement, and material fulfillment summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: DbId,
    pub calculation_id: Option<DbId>,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,

    pub phases: PhaseSet,
    pub invoice_reference: Option<String>,

    pub timeline_slot: Option<TimelineSlot>,
    pub team: Option<TeamRef>,

    pub status_override: Option<OverallStatus>,
    /// Derived: override when present, otherwise a pure function of the phases.
    pub overall_status: OverallStatus,
    /// Percentage of phases in terminal status, 25% each.
    pub progress: u8,

    pub material: MaterialAggregate,
    /// Whether all ordered material has been delivered (tracker's signal for
    /// the material phase).
    pub material_ready: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lightweight listing row for the dashboard; skips the material aggregate
/// so listing stays a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub address: String,
    pub customer_name: String,
    pub team_code: Option<String>,
    pub planned_start: Option<PlanDate>,
    pub planned_end: Option<PlanDate>,
    pub overall_status: OverallStatus,
    pub progress: u8,
    pub created_at: Timestamp,
}

/// One bar on the planner: slot dates plus the derived rendering inputs
/// (progress percentage, team color).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannerTask {
    pub project_id: DbId,
    pub customer_name: String,
    pub address: String,
    pub start: PlanDate,
    pub end: PlanDate,
    pub team: Option<TeamRef>,
    pub overall_status: OverallStatus,
    pub progress: u8,
}

/// A material request plus the soft-rule warning flag.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialRequestView {
    #[serde(flatten)]
    pub request: roofline_db::models::material_request::MaterialRequest,
    /// Set when the request is ordered without an estimated delivery date.
    pub needs_estimate: bool,
}
