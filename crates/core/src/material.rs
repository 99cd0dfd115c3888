//! Material-request lifecycle.
//!
//! State machine per request:
//!
//! ```text
//! pending --approve--> approved --order--> ordered --deliver--> delivered
//! pending/approved/ordered --cancel--> cancelled
//! ```
//!
//! `delivered` and `cancelled` are terminal. Re-applying the event that
//! produced the current state is an idempotent no-op; any other event not
//! reachable from the current state is an [`CoreError::InvalidTransition`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::PlanDate;

// ---------------------------------------------------------------------------
// Status and events
// ---------------------------------------------------------------------------

/// Lifecycle status of a material request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    Pending,
    Approved,
    Ordered,
    Delivered,
    Cancelled,
}

impl MaterialStatus {
    /// Convert from the database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "ordered" => Ok(Self::Ordered),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Unknown material status '{s}'"
            ))),
        }
    }

    /// The canonical string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Ordered => "ordered",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the request has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// An event applied to a material request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialEvent {
    Approve,
    Order,
    Deliver,
    Cancel,
}

impl MaterialEvent {
    /// The state this event moves a request into.
    pub fn target(&self) -> MaterialStatus {
        match self {
            Self::Approve => MaterialStatus::Approved,
            Self::Order => MaterialStatus::Ordered,
            Self::Deliver => MaterialStatus::Delivered,
            Self::Cancel => MaterialStatus::Cancelled,
        }
    }

    /// The states this event may fire from.
    fn valid_from(&self) -> &'static [MaterialStatus] {
        match self {
            Self::Approve => &[MaterialStatus::Pending],
            Self::Order => &[MaterialStatus::Approved],
            Self::Deliver => &[MaterialStatus::Ordered],
            Self::Cancel => &[
                MaterialStatus::Pending,
                MaterialStatus::Approved,
                MaterialStatus::Ordered,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Transition application
// ---------------------------------------------------------------------------

/// Outcome of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialTransition {
    pub next: MaterialStatus,
    /// `false` when the event was an idempotent re-application.
    pub changed: bool,
}

/// Apply `event` to a request currently in `current`.
pub fn apply_event(
    current: MaterialStatus,
    event: MaterialEvent,
) -> Result<MaterialTransition, CoreError> {
    // Idempotent re-application: the request is already where the event
    // would put it.
    if event.target() == current {
        return Ok(MaterialTransition {
            next: current,
            changed: false,
        });
    }

    if !event.valid_from().contains(&current) {
        return Err(CoreError::InvalidTransition(format!(
            "Cannot apply '{event:?}' to a request in state '{}'",
            current.as_str()
        )));
    }

    Ok(MaterialTransition {
        next: event.target(),
        changed: true,
    })
}

/// Whether a request needs a delivery estimate warning after a transition.
///
/// Ordering without an estimated delivery date succeeds but is flagged for
/// the UI. Soft rule only.
pub fn needs_estimate(status: MaterialStatus, estimated_delivery: Option<PlanDate>) -> bool {
    status == MaterialStatus::Ordered && estimated_delivery.is_none()
}

// ---------------------------------------------------------------------------
// Items, priority, and per-project aggregate
// ---------------------------------------------------------------------------

/// One requested line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
}

/// Total cost of a set of line items.
pub fn total_cost(items: &[MaterialItem]) -> f64 {
    items.iter().map(|i| i.quantity * i.unit_cost).sum()
}

/// Request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl MaterialPriority {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(CoreError::Validation(format!("Unknown priority '{s}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Per-project fulfillment summary, driving the material phase indirectly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialAggregate {
    /// Requests still awaiting approval or ordering.
    pub open: i64,
    pub ordered: i64,
    pub delivered: i64,
    pub total_cost: f64,
}

/// Whether all ordered material for a project has arrived: at least one
/// request exists and every non-cancelled request is delivered.
pub fn all_material_delivered(statuses: &[MaterialStatus]) -> bool {
    let live: Vec<_> = statuses
        .iter()
        .filter(|s| **s != MaterialStatus::Cancelled)
        .collect();
    !live.is_empty() && live.iter().all(|s| **s == MaterialStatus::Delivered)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn full_lifecycle_pending_to_delivered() {
        let mut status = MaterialStatus::Pending;
        for event in [
            MaterialEvent::Approve,
            MaterialEvent::Order,
            MaterialEvent::Deliver,
        ] {
            let t = apply_event(status, event).unwrap();
            assert!(t.changed);
            status = t.next;
        }
        assert_eq!(status, MaterialStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn cancel_from_each_live_state() {
        for from in [
            MaterialStatus::Pending,
            MaterialStatus::Approved,
            MaterialStatus::Ordered,
        ] {
            let t = apply_event(from, MaterialEvent::Cancel).unwrap();
            assert_eq!(t.next, MaterialStatus::Cancelled);
        }
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn approve_after_cancel_is_invalid() {
        let cancelled = apply_event(MaterialStatus::Pending, MaterialEvent::Cancel)
            .unwrap()
            .next;
        assert_matches!(
            apply_event(cancelled, MaterialEvent::Approve),
            Err(CoreError::InvalidTransition(_))
        );
    }

    #[test]
    fn cannot_skip_approval() {
        assert_matches!(
            apply_event(MaterialStatus::Pending, MaterialEvent::Order),
            Err(CoreError::InvalidTransition(_))
        );
    }

    #[test]
    fn cannot_deliver_before_ordering() {
        assert_matches!(
            apply_event(MaterialStatus::Approved, MaterialEvent::Deliver),
            Err(CoreError::InvalidTransition(_))
        );
    }

    #[test]
    fn cannot_cancel_delivered() {
        assert_matches!(
            apply_event(MaterialStatus::Delivered, MaterialEvent::Cancel),
            Err(CoreError::InvalidTransition(_))
        );
    }

    // -----------------------------------------------------------------------
    // Idempotence
    // -----------------------------------------------------------------------

    #[test]
    fn reapplying_same_event_is_a_no_op() {
        let t = apply_event(MaterialStatus::Approved, MaterialEvent::Approve).unwrap();
        assert_eq!(t.next, MaterialStatus::Approved);
        assert!(!t.changed);

        let t = apply_event(MaterialStatus::Cancelled, MaterialEvent::Cancel).unwrap();
        assert_eq!(t.next, MaterialStatus::Cancelled);
        assert!(!t.changed);
    }

    // -----------------------------------------------------------------------
    // Estimate warning
    // -----------------------------------------------------------------------

    #[test]
    fn ordering_without_estimate_is_flagged() {
        assert!(needs_estimate(MaterialStatus::Ordered, None));
        assert!(!needs_estimate(
            MaterialStatus::Ordered,
            NaiveDate::from_ymd_opt(2025, 8, 1)
        ));
        assert!(!needs_estimate(MaterialStatus::Approved, None));
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    #[test]
    fn total_cost_sums_line_items() {
        let items = vec![
            MaterialItem {
                name: "Roof tile".into(),
                quantity: 400.0,
                unit: "pcs".into(),
                unit_cost: 2.5,
            },
            MaterialItem {
                name: "Underlay".into(),
                quantity: 3.0,
                unit: "roll".into(),
                unit_cost: 80.0,
            },
        ];
        assert_eq!(total_cost(&items), 1240.0);
    }

    #[test]
    fn material_done_requires_everything_delivered() {
        assert!(!all_material_delivered(&[]));
        assert!(!all_material_delivered(&[
            MaterialStatus::Delivered,
            MaterialStatus::Ordered
        ]));
        assert!(all_material_delivered(&[MaterialStatus::Delivered]));
        // Cancelled requests do not block completion.
        assert!(all_material_delivered(&[
            MaterialStatus::Delivered,
            MaterialStatus::Cancelled
        ]));
        // A project with only cancelled requests has delivered nothing.
        assert!(!all_material_delivered(&[MaterialStatus::Cancelled]));
    }
}
