//! Phase ledger: the four fixed construction phases and their state machine.
//!
//! Transitions are deliberately free in both directions -- an operator may
//! revert a mistaken "completed" back to "pending". The only hard rules are
//! the per-phase status sets (invoicing has no in-progress state) and the
//! completed-date invariant: a phase carries a `completed_date` exactly when
//! its status is terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Phase names
// ---------------------------------------------------------------------------

/// The fixed workflow phases, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Scaffolding,
    Removal,
    Material,
    Invoicing,
}

/// All phases in pipeline order. Each contributes 25% to aggregate progress.
pub const ALL_PHASES: [PhaseName; 4] = [
    PhaseName::Scaffolding,
    PhaseName::Removal,
    PhaseName::Material,
    PhaseName::Invoicing,
];

impl PhaseName {
    /// Convert from the URL/database string value.
    ///
    /// An unknown name is an [`CoreError::InvalidTransition`]: the ledger has
    /// no such phase to move.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "scaffolding" => Ok(Self::Scaffolding),
            "removal" => Ok(Self::Removal),
            "material" => Ok(Self::Material),
            "invoicing" => Ok(Self::Invoicing),
            _ => Err(CoreError::InvalidTransition(format!(
                "Unknown phase '{s}'. Must be one of: scaffolding, removal, material, invoicing"
            ))),
        }
    }

    /// The canonical string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scaffolding => "scaffolding",
            Self::Removal => "removal",
            Self::Material => "material",
            Self::Invoicing => "invoicing",
        }
    }

    /// The status values this phase may take.
    ///
    /// Invoicing is a two-state phase: it is either outstanding or done.
    pub fn allowed_statuses(&self) -> &'static [PhaseStatus] {
        match self {
            Self::Invoicing => &[PhaseStatus::Pending, PhaseStatus::Completed],
            _ => &[
                PhaseStatus::Pending,
                PhaseStatus::InProgress,
                PhaseStatus::Completed,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Phase status
// ---------------------------------------------------------------------------

/// Status of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
}

impl PhaseStatus {
    /// Convert from the database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(CoreError::InvalidTransition(format!(
                "Unknown phase status '{s}'. Must be one of: pending, in_progress, completed"
            ))),
        }
    }

    /// The canonical string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Whether this status is terminal for the phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

// ---------------------------------------------------------------------------
// Phase state and transitions
// ---------------------------------------------------------------------------

/// The persisted state of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub status: PhaseStatus,
    pub completed_date: Option<Timestamp>,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self {
            status: PhaseStatus::Pending,
            completed_date: None,
        }
    }
}

/// Apply a status change to a single phase.
///
/// Rules:
/// - `new_status` must belong to the phase's allowed set, otherwise
///   [`CoreError::InvalidTransition`].
/// - Entering a terminal status sets `completed_date` to the caller-supplied
///   value, falling back to the previously stored date, then to `now`.
/// - Leaving a terminal status clears `completed_date`.
pub fn apply_transition(
    phase: PhaseName,
    current: &PhaseState,
    new_status: PhaseStatus,
    completed_date: Option<Timestamp>,
    now: Timestamp,
) -> Result<PhaseState, CoreError> {
    if !phase.allowed_statuses().contains(&new_status) {
        return Err(CoreError::InvalidTransition(format!(
            "Phase '{}' does not allow status '{}'",
            phase.as_str(),
            new_status.as_str()
        )));
    }

    let completed_date = if new_status.is_terminal() {
        Some(completed_date.or(current.completed_date).unwrap_or(now))
    } else {
        None
    };

    Ok(PhaseState {
        status: new_status,
        completed_date,
    })
}

// ---------------------------------------------------------------------------
// Phase set and aggregate progress
// ---------------------------------------------------------------------------

/// The full phase ledger of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSet {
    pub scaffolding: PhaseState,
    pub removal: PhaseState,
    pub material: PhaseState,
    pub invoicing: PhaseState,
}

impl PhaseSet {
    pub fn get(&self, name: PhaseName) -> &PhaseState {
        match name {
            PhaseName::Scaffolding => &self.scaffolding,
            PhaseName::Removal => &self.removal,
            PhaseName::Material => &self.material,
            PhaseName::Invoicing => &self.invoicing,
        }
    }

    pub fn set(&mut self, name: PhaseName, state: PhaseState) {
        match name {
            PhaseName::Scaffolding => self.scaffolding = state,
            PhaseName::Removal => self.removal = state,
            PhaseName::Material => self.material = state,
            PhaseName::Invoicing => self.invoicing = state,
        }
    }

    /// Number of phases in terminal status.
    pub fn completed_count(&self) -> usize {
        ALL_PHASES
            .iter()
            .filter(|p| self.get(**p).status.is_terminal())
            .count()
    }
}

/// Aggregate progress percentage: each phase weighs a fixed 25%.
pub fn aggregate_progress(phases: &PhaseSet) -> u8 {
    (phases.completed_count() * 25) as u8
}

// ---------------------------------------------------------------------------
// Overall status
// ---------------------------------------------------------------------------

/// The derived overall status of a project.
///
/// `OnHold` and `Cancelled` are never computed; they only appear via an
/// explicit operator override stored on the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pending,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl OverallStatus {
    /// Convert from the database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Unknown overall status '{s}'"
            ))),
        }
    }

    /// The canonical string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Validate a stored status override. Only `on_hold` and `cancelled` may be
/// set explicitly; everything else is derived.
pub fn validate_override(status: OverallStatus) -> Result<(), CoreError> {
    match status {
        OverallStatus::OnHold | OverallStatus::Cancelled => Ok(()),
        other => Err(CoreError::Validation(format!(
            "Status '{}' cannot be set directly; it is derived from the phases",
            other.as_str()
        ))),
    }
}

/// Derive the overall status from the phase ledger and an optional override.
pub fn derive_overall(phases: &PhaseSet, status_override: Option<OverallStatus>) -> OverallStatus {
    if let Some(overridden) = status_override {
        return overridden;
    }
    match phases.completed_count() {
        0 => OverallStatus::Pending,
        4 => OverallStatus::Completed,
        _ => OverallStatus::InProgress,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
