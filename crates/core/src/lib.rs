//! Roofline domain core.
//!
//! Pure workflow logic for the project pipeline: the four construction
//! phases, timeline/team placement, and the material-request lifecycle.
//! This crate has zero internal deps and no database access so it can be
//! used by the API layer, repositories, and any future CLI tooling alike.

pub mod error;
pub mod material;
pub mod phase;
pub mod team;
pub mod timeline;
pub mod types;

pub use error::CoreError;
