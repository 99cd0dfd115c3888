//! The workflow facade: single mutation entry point over the core.
//!
//! All project mutations funnel through [`WorkflowService::apply_event`],
//! which serializes writes per project, runs the core state machines,
//! persists the outcome with a bounded write timeout, and publishes domain
//! events for anything that actually changed. Reads bypass the locks.

pub mod locks;
pub mod view;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use roofline_core::error::CoreError;
use roofline_core::material::{self, MaterialStatus};
use roofline_core::phase::{self, OverallStatus, PhaseName, PhaseStatus};
use roofline_core::timeline::{self, SchedulingConflict};
use roofline_core::types::{DbId, PlanDate, Timestamp};
use roofline_db::models::material_request::{CreateMaterialRequest, UpdateMaterialRequest};
use roofline_db::models::project::{CreateProject, Project, ProjectFilter};
use roofline_db::repositories::{MaterialRequestRepo, ProjectRepo, TeamRepo};
use roofline_db::DbPool;
use roofline_events::{DomainEvent, EventBus};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use locks::ProjectLocks;
use view::{MaterialRequestView, PlannerTask, ProjectSummary, ProjectView, TeamRef};

// ---------------------------------------------------------------------------
// Workflow events and outcomes
// ---------------------------------------------------------------------------

/// A mutation request against one project aggregate.
///
/// Deserialized straight from the HTTP body, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// Change one phase's status, optionally with an explicit completion
    /// date. An invoice reference may ride along for the invoicing phase.
    Phase {
        phase: PhaseName,
        status: PhaseStatus,
        completed_date: Option<Timestamp>,
        invoice_reference: Option<String>,
    },
    /// Place (or move) the project on the planner.
    Schedule {
        start_date: PlanDate,
        end_date: PlanDate,
        team_code: Option<String>,
        #[serde(default)]
        force: bool,
    },
    /// Swap the assigned team while keeping the dates.
    ReassignTeam {
        team_code: Option<String>,
        #[serde(default)]
        force: bool,
    },
    /// Take the project off the planner entirely.
    RemoveFromTimeline,
    /// Set or clear the explicit overall-status override.
    StatusOverride { status: Option<OverallStatus> },
}

/// Result of applying a [`WorkflowEvent`].
///
/// `applied` is `false` only for the advisory double-booking case: the
/// placement was not written and `conflict` tells the caller what to confirm
/// before retrying with `force`.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub project: ProjectView,
    pub conflict: Option<SchedulingConflict>,
    pub applied: bool,
    #[serde(skip)]
    pub events: Vec<DomainEvent>,
}

impl MutationOutcome {
    fn applied(project: ProjectView, events: Vec<DomainEvent>) -> Self {
        Self {
            project,
            conflict: None,
            applied: true,
            events,
        }
    }

    fn rejected(project: ProjectView, conflict: SchedulingConflict) -> Self {
        Self {
            project,
            conflict: Some(conflict),
            applied: false,
            events: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Coordinates the phase ledger, planner, and material tracker over one
/// database pool.
pub struct WorkflowService {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    locks: ProjectLocks,
    persistence_timeout: Duration,
    retry_backoff: Duration,
}

impl WorkflowService {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>, config: &ServerConfig) -> Self {
        Self {
            pool,
            event_bus,
            locks: ProjectLocks::default(),
            persistence_timeout: Duration::from_millis(config.persistence_timeout_ms),
            retry_backoff: Duration::from_millis(config.persistence_retry_backoff_ms),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a project with all phases pending and no planner placement.
    pub async fn create_project(&self, input: CreateProject) -> AppResult<ProjectView> {
        if input.address.trim().is_empty() {
            return Err(CoreError::Validation("Address must not be empty".into()).into());
        }
        if input.customer_name.trim().is_empty() {
            return Err(CoreError::Validation("Customer name must not be empty".into()).into());
        }

        let pool = self.pool.clone();
        let project = self
            .persist("projects.create", || {
                let pool = pool.clone();
                let input = input.clone();
                async move { ProjectRepo::create(&pool, &input).await }
            })
            .await?;

        self.publish_all(&[DomainEvent::for_project("project.created", project.id)
            .with_payload(json!({
                "customer_name": project.customer_name,
                "address": project.address,
            }))]);

        self.view(project).await
    }

    /// Apply one workflow event to a project, serialized per project id.
    pub async fn apply_event(
        &self,
        project_id: DbId,
        event: WorkflowEvent,
    ) -> AppResult<MutationOutcome> {
        let _guard = self.locks.acquire(project_id).await;
        let project = self.load(project_id).await?;

        let outcome = match event {
            WorkflowEvent::Phase {
                phase,
                status,
                completed_date,
                invoice_reference,
            } => {
                self.apply_phase(project, phase, status, completed_date, invoice_reference)
                    .await?
            }
            WorkflowEvent::Schedule {
                start_date,
                end_date,
                team_code,
                force,
            } => {
                self.apply_schedule(project, start_date, end_date, team_code, force)
                    .await?
            }
            WorkflowEvent::ReassignTeam { team_code, force } => {
                self.apply_reassign(project, team_code, force).await?
            }
            WorkflowEvent::RemoveFromTimeline => self.apply_remove(project).await?,
            WorkflowEvent::StatusOverride { status } => {
                self.apply_override(project, status).await?
            }
        };

        self.publish_all(&outcome.events);
        Ok(outcome)
    }

    async fn apply_phase(
        &self,
        project: Project,
        phase_name: PhaseName,
        status: PhaseStatus,
        completed_date: Option<Timestamp>,
        invoice_reference: Option<String>,
    ) -> AppResult<MutationOutcome> {
        if invoice_reference.is_some() && phase_name != PhaseName::Invoicing {
            return Err(CoreError::Validation(
                "An invoice reference belongs to the invoicing phase".into(),
            )
            .into());
        }

        let current = *project.phases()?.get(phase_name);
        let next = phase::apply_transition(phase_name, &current, status, completed_date, Utc::now())?;
        let newly_completed = next.status.is_terminal() && !current.status.is_terminal();

        let pool = self.pool.clone();
        let id = project.id;
        let updated = self
            .persist("projects.update_phase", || {
                let pool = pool.clone();
                let invoice_reference = invoice_reference.clone();
                async move {
                    ProjectRepo::update_phase(&pool, id, phase_name, &next, invoice_reference.as_deref())
                        .await
                }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;

        let progress = phase::aggregate_progress(&updated.phases()?);
        let mut events = vec![DomainEvent::for_project("project.phase_updated", id)
            .with_payload(json!({
                "phase": phase_name.as_str(),
                "status": next.status.as_str(),
                "progress": progress,
            }))];
        if newly_completed {
            events.push(
                DomainEvent::for_project("project.phase_completed", id).with_payload(json!({
                    "phase": phase_name.as_str(),
                    "completed_date": next.completed_date,
                })),
            );
        }

        Ok(MutationOutcome::applied(self.view(updated).await?, events))
    }

    async fn apply_schedule(
        &self,
        project: Project,
        start: PlanDate,
        end: PlanDate,
        team_code: Option<String>,
        force: bool,
    ) -> AppResult<MutationOutcome> {
        timeline::validate_range(start, end)?;

        let conflict = match team_code.as_deref() {
            Some(code) => {
                self.ensure_team_exists(code).await?;
                let slots = ProjectRepo::team_slots(&self.pool, code).await?;
                timeline::find_conflicts(code, start, end, project.id, &slots)
            }
            None => None,
        };

        if let Some(conflict) = &conflict {
            if !force {
                tracing::info!(
                    project_id = project.id,
                    team_code = conflict.team_code,
                    conflicts = conflict.conflicts.len(),
                    "Placement rejected: team double-booked"
                );
                return Ok(MutationOutcome::rejected(
                    self.view(project).await?,
                    conflict.clone(),
                ));
            }
            tracing::info!(
                project_id = project.id,
                team_code = conflict.team_code,
                "Placement forced over a double-booking"
            );
        }

        let pool = self.pool.clone();
        let id = project.id;
        let updated = self
            .persist("projects.set_timeline", || {
                let pool = pool.clone();
                let team_code = team_code.clone();
                async move {
                    ProjectRepo::set_timeline(&pool, id, start, end, team_code.as_deref()).await
                }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;

        let events = vec![DomainEvent::for_project("project.scheduled", id)
            .with_payload(json!({
                "start_date": start,
                "end_date": end,
                "team_code": updated.team_code,
                "forced": conflict.is_some(),
            }))];

        // A forced placement still reports what it overrode.
        Ok(MutationOutcome {
            project: self.view(updated).await?,
            conflict,
            applied: true,
            events,
        })
    }

    async fn apply_reassign(
        &self,
        project: Project,
        team_code: Option<String>,
        force: bool,
    ) -> AppResult<MutationOutcome> {
        // A reassignment can double-book too when the project already holds
        // a slot on the planner.
        let conflict = match (team_code.as_deref(), project.planned_start, project.planned_end) {
            (Some(code), Some(start), Some(end)) => {
                self.ensure_team_exists(code).await?;
                let slots = ProjectRepo::team_slots(&self.pool, code).await?;
                timeline::find_conflicts(code, start, end, project.id, &slots)
            }
            (Some(code), _, _) => {
                self.ensure_team_exists(code).await?;
                None
            }
            _ => None,
        };

        if let Some(conflict) = &conflict {
            if !force {
                return Ok(MutationOutcome::rejected(
                    self.view(project).await?,
                    conflict.clone(),
                ));
            }
        }

        let pool = self.pool.clone();
        let id = project.id;
        let updated = self
            .persist("projects.set_team", || {
                let pool = pool.clone();
                let team_code = team_code.clone();
                async move { ProjectRepo::set_team(&pool, id, team_code.as_deref()).await }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;

        let events = vec![DomainEvent::for_project("project.team_reassigned", id)
            .with_payload(json!({ "team_code": updated.team_code }))];

        Ok(MutationOutcome {
            project: self.view(updated).await?,
            conflict,
            applied: true,
            events,
        })
    }

    async fn apply_remove(&self, project: Project) -> AppResult<MutationOutcome> {
        let pool = self.pool.clone();
        let id = project.id;
        let updated = self
            .persist("projects.clear_timeline", || {
                let pool = pool.clone();
                async move { ProjectRepo::clear_timeline(&pool, id).await }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;

        let events = vec![DomainEvent::for_project("project.unscheduled", id)];

        Ok(MutationOutcome::applied(self.view(updated).await?, events))
    }

    async fn apply_override(
        &self,
        project: Project,
        status: Option<OverallStatus>,
    ) -> AppResult<MutationOutcome> {
        if let Some(status) = status {
            phase::validate_override(status)?;
        }

        let pool = self.pool.clone();
        let id = project.id;
        let updated = self
            .persist("projects.set_status_override", || {
                let pool = pool.clone();
                async move {
                    ProjectRepo::set_status_override(&pool, id, status.map(|s| s.as_str())).await
                }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;

        let events = vec![DomainEvent::for_project("project.status_overridden", id)
            .with_payload(json!({ "status": status }))];

        Ok(MutationOutcome::applied(self.view(updated).await?, events))
    }

    // -----------------------------------------------------------------------
    // Material requests
    // -----------------------------------------------------------------------

    /// Create a material request in `pending` state for a project.
    pub async fn create_material_request(
        &self,
        project_id: DbId,
        input: CreateMaterialRequest,
    ) -> AppResult<MaterialRequestView> {
        if input.items.is_empty() {
            return Err(
                CoreError::Validation("A material request needs at least one item".into()).into(),
            );
        }

        let _guard = self.locks.acquire(project_id).await;
        self.load(project_id).await?;

        let pool = self.pool.clone();
        let request = self
            .persist("material_requests.create", || {
                let pool = pool.clone();
                let input = input.clone();
                async move { MaterialRequestRepo::create(&pool, project_id, &input).await }
            })
            .await?;

        self.publish_all(&[DomainEvent::for_material_request(
            "material.requested",
            request.id,
        )
        .with_payload(json!({
            "project_id": project_id,
            "priority": request.priority,
        }))]);

        Ok(MaterialRequestView {
            needs_estimate: false,
            request,
        })
    }

    /// Apply a lifecycle event and/or field edits to a material request.
    pub async fn update_material_request(
        &self,
        request_id: DbId,
        input: UpdateMaterialRequest,
    ) -> AppResult<MaterialRequestView> {
        let owner = MaterialRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "MaterialRequest",
                id: request_id,
            })?
            .project_id;

        // A request claimed under the wrong project is invisible, not a 400.
        if let Some(claimed) = input.project_id {
            if claimed != owner {
                return Err(CoreError::NotFound {
                    entity: "MaterialRequest",
                    id: request_id,
                }
                .into());
            }
        }

        // Re-read under the lock so the transition starts from the state no
        // concurrent mutation can still change.
        let _guard = self.locks.acquire(owner).await;
        let existing = MaterialRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "MaterialRequest",
                id: request_id,
            })?;

        let current = existing.status()?;
        let transition = match input.event {
            Some(event) => material::apply_event(current, event)?,
            None => material::MaterialTransition {
                next: current,
                changed: false,
            },
        };

        // Merge the PATCH body against the stored row. An omitted field keeps
        // the stored value, an explicit null clears it.
        let priority = input
            .priority
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| existing.priority.clone());
        let estimated_delivery = input
            .estimated_delivery
            .unwrap_or(existing.estimated_delivery);
        let notes = input.notes.unwrap_or_else(|| existing.notes.clone());

        // Delivery stamps an actual date; an operator-supplied one wins.
        let actual_delivery = input.actual_delivery.unwrap_or(existing.actual_delivery);
        let actual_delivery = if transition.changed && transition.next == MaterialStatus::Delivered
        {
            actual_delivery.or_else(|| Some(Utc::now().date_naive()))
        } else {
            actual_delivery
        };

        let pool = self.pool.clone();
        let updated = self
            .persist("material_requests.apply_update", || {
                let pool = pool.clone();
                let priority = priority.clone();
                let notes = notes.clone();
                async move {
                    MaterialRequestRepo::apply_update(
                        &pool,
                        request_id,
                        transition.next.as_str(),
                        &priority,
                        estimated_delivery,
                        actual_delivery,
                        notes.as_deref(),
                    )
                    .await
                }
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "MaterialRequest",
                id: request_id,
            })?;

        if transition.changed {
            let mut events = vec![DomainEvent::for_material_request(
                "material.status_changed",
                request_id,
            )
            .with_payload(json!({
                "project_id": existing.project_id,
                "from": current.as_str(),
                "to": transition.next.as_str(),
            }))];
            if transition.next == MaterialStatus::Delivered {
                events.push(
                    DomainEvent::for_material_request("material.delivered", request_id)
                        .with_payload(json!({ "project_id": existing.project_id })),
                );
            }
            self.publish_all(&events);
        }

        let needs_estimate = material::needs_estimate(transition.next, updated.estimated_delivery);
        Ok(MaterialRequestView {
            needs_estimate,
            request: updated,
        })
    }

    /// List a project's material requests, oldest first, with the
    /// fulfillment aggregate.
    pub async fn list_material_requests(
        &self,
        project_id: DbId,
    ) -> AppResult<(Vec<MaterialRequestView>, material::MaterialAggregate)> {
        self.load(project_id).await?;

        let requests = MaterialRequestRepo::list_by_project(&self.pool, project_id).await?;
        let aggregate = MaterialRequestRepo::aggregate_for_project(&self.pool, project_id).await?;

        let views = requests
            .into_iter()
            .map(|request| {
                let needs_estimate = request
                    .status()
                    .map(|s| material::needs_estimate(s, request.estimated_delivery))
                    .unwrap_or(false);
                MaterialRequestView {
                    needs_estimate,
                    request,
                }
            })
            .collect();

        Ok((views, aggregate))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The full aggregate view of one project.
    pub async fn get_project(&self, project_id: DbId) -> AppResult<ProjectView> {
        let project = self.load(project_id).await?;
        self.view(project).await
    }

    /// Dashboard listing with optional team/status/free-text filters.
    pub async fn list_projects(&self, filter: ProjectFilter) -> AppResult<Vec<ProjectSummary>> {
        // Reject unknown status filters up front instead of returning an
        // empty list for a typo.
        if let Some(status) = filter.status.as_deref() {
            OverallStatus::from_str_value(status)?;
        }

        let rows = ProjectRepo::list(&self.pool, &filter).await?;
        rows.into_iter()
            .map(|project| {
                let phases = project.phases()?;
                let overall_status = phase::derive_overall(&phases, project.status_override()?);
                Ok(ProjectSummary {
                    id: project.id,
                    address: project.address,
                    customer_name: project.customer_name,
                    team_code: project.team_code,
                    planned_start: project.planned_start,
                    planned_end: project.planned_end,
                    overall_status,
                    progress: phase::aggregate_progress(&phases),
                    created_at: project.created_at,
                })
            })
            .collect()
    }

    /// Planner bars for a date window, ordered by start date then id.
    pub async fn planner_tasks(
        &self,
        start: PlanDate,
        end: PlanDate,
        team_code: Option<&str>,
    ) -> AppResult<Vec<PlannerTask>> {
        timeline::validate_range(start, end)?;

        let rows = ProjectRepo::slots_in_range(&self.pool, start, end, team_code).await?;
        let teams: HashMap<String, TeamRef> = TeamRepo::list(&self.pool)
            .await?
            .into_iter()
            .map(|t| {
                (
                    t.code.clone(),
                    TeamRef {
                        code: t.code,
                        name: t.name,
                        color: t.color,
                    },
                )
            })
            .collect();

        let mut tasks = Vec::with_capacity(rows.len());
        for project in rows {
            // The query guarantees both dates; skip defensively typed rows.
            let (Some(slot_start), Some(slot_end)) = (project.planned_start, project.planned_end)
            else {
                continue;
            };
            let phases = project.phases()?;
            let overall_status = phase::derive_overall(&phases, project.status_override()?);
            tasks.push(PlannerTask {
                project_id: project.id,
                customer_name: project.customer_name,
                address: project.address,
                start: slot_start,
                end: slot_end,
                team: project.team_code.as_ref().and_then(|c| teams.get(c).cloned()),
                overall_status,
                progress: phase::aggregate_progress(&phases),
            });
        }
        Ok(tasks)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn load(&self, project_id: DbId) -> AppResult<Project> {
        ProjectRepo::find_by_id(&self.pool, project_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Project",
                    id: project_id,
                }
                .into()
            })
    }

    async fn ensure_team_exists(&self, code: &str) -> AppResult<()> {
        TeamRepo::find_by_code(&self.pool, code)
            .await?
            .ok_or_else(|| CoreError::NotFoundByKey {
                entity: "Team",
                key: code.to_string(),
            })?;
        Ok(())
    }

    /// Assemble the full aggregate view for one project row.
    async fn view(&self, project: Project) -> AppResult<ProjectView> {
        let phases = project.phases()?;
        let status_override = project.status_override()?;
        let overall_status = phase::derive_overall(&phases, status_override);
        let progress = phase::aggregate_progress(&phases);

        let aggregate = MaterialRequestRepo::aggregate_for_project(&self.pool, project.id).await?;
        let statuses = MaterialRequestRepo::statuses_for_project(&self.pool, project.id)
            .await?
            .iter()
            .map(|s| MaterialStatus::from_str_value(s))
            .collect::<Result<Vec<_>, _>>()?;
        let material_ready = material::all_material_delivered(&statuses);

        let team = match project.team_code.as_deref() {
            Some(code) => TeamRepo::find_by_code(&self.pool, code)
                .await?
                .map(|t| TeamRef {
                    code: t.code,
                    name: t.name,
                    color: t.color,
                }),
            None => None,
        };

        Ok(ProjectView {
            id: project.id,
            calculation_id: project.calculation_id,
            address: project.address,
            customer_name: project.customer_name,
            customer_phone: project.customer_phone,
            phases,
            invoice_reference: project.invoice_reference,
            timeline_slot: match (project.planned_start, project.planned_end) {
                (Some(start), Some(end)) => Some(timeline::TimelineSlot {
                    project_id: project.id,
                    team_code: project.team_code,
                    start,
                    end,
                }),
                _ => None,
            },
            team,
            status_override,
            overall_status,
            progress,
            material: aggregate,
            material_ready,
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }

    /// Run one persistence write with a timeout and a single retry.
    ///
    /// The closure builds a fresh future per attempt. A write that does not
    /// acknowledge within the window is retried once after a short backoff;
    /// a second timeout surfaces as [`AppError::PersistenceTimeout`] and the
    /// mutation is reported as failed.
    async fn persist<T, F, Fut>(&self, label: &'static str, op: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.persistence_timeout, op()).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(write = label, "Persistence write timed out, retrying once");
                tokio::time::sleep(self.retry_backoff).await;
                match tokio::time::timeout(self.persistence_timeout, op()).await {
                    Ok(result) => Ok(result?),
                    Err(_) => {
                        tracing::error!(write = label, "Persistence write timed out after retry");
                        Err(AppError::PersistenceTimeout)
                    }
                }
            }
        }
    }

    fn publish_all(&self, events: &[DomainEvent]) {
        for event in events {
            self.event_bus.publish(event.clone());
        }
    }
}
