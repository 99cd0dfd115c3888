//! Timeline placement and team double-booking detection.
//!
//! A project occupies the planner as a `(start, end, team)` slot. Two slots
//! of the same team conflict when their date ranges intersect under the
//! half-open test `a.start < b.end && b.start < a.end`. Conflicts are
//! advisory: the caller may force-place after confirming, so detection
//! returns data rather than an error.
//!
//! The O(n) scan per check is fine for the in-scope planner horizon (a few
//! months, low hundreds of projects); an interval tree per team would bring
//! placement to O(log n) if that ever grows.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, PlanDate};

// ---------------------------------------------------------------------------
// Slot types
// ---------------------------------------------------------------------------

/// A project's placement on the shared planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSlot {
    pub project_id: DbId,
    pub team_code: Option<String>,
    pub start: PlanDate,
    pub end: PlanDate,
}

/// One conflicting placement, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingSlot {
    pub project_id: DbId,
    pub start: PlanDate,
    pub end: PlanDate,
}

/// Advisory double-booking report for one team.
///
/// Carried in a successful response payload so the UI can offer an override,
/// never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConflict {
    pub team_code: String,
    pub conflicts: Vec<ConflictingSlot>,
}

// ---------------------------------------------------------------------------
// Validation and overlap detection
// ---------------------------------------------------------------------------

/// Validate a planning date range.
pub fn validate_range(start: PlanDate, end: PlanDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "Start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

/// Half-open interval intersection test.
pub fn ranges_overlap(a_start: PlanDate, a_end: PlanDate, b_start: PlanDate, b_end: PlanDate) -> bool {
    a_start < b_end && b_start < a_end
}

/// Scan `existing` slots for double-bookings of `team_code` against the
/// candidate range, skipping the project being (re)placed itself.
///
/// Returns `None` when the placement is clean.
pub fn find_conflicts(
    team_code: &str,
    start: PlanDate,
    end: PlanDate,
    own_project_id: DbId,
    existing: &[TimelineSlot],
) -> Option<SchedulingConflict> {
    let conflicts: Vec<ConflictingSlot> = existing
        .iter()
        .filter(|slot| slot.project_id != own_project_id)
        .filter(|slot| slot.team_code.as_deref() == Some(team_code))
        .filter(|slot| ranges_overlap(start, end, slot.start, slot.end))
        .map(|slot| ConflictingSlot {
            project_id: slot.project_id,
            start: slot.start,
            end: slot.end,
        })
        .collect();

    if conflicts.is_empty() {
        None
    } else {
        Some(SchedulingConflict {
            team_code: team_code.to_string(),
            conflicts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
