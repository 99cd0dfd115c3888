use std::sync::Arc;

use crate::config::ServerConfig;
use crate::workflow::WorkflowService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: roofline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<roofline_events::EventBus>,
    /// Workflow facade: the single mutation entry point over the core.
    pub workflow: Arc<WorkflowService>,
}
