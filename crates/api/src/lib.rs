//! Roofline HTTP API.
//!
//! Exposes the workflow core over JSON/HTTP: project phase updates, planner
//! placement, material requests, and team configuration. Authentication and
//! role checks are handled upstream and are out of scope here.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
pub mod workflow;
