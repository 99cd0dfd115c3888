//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod material_request_repo;
pub mod project_repo;
pub mod team_repo;

pub use event_repo::EventRepo;
pub use material_request_repo::MaterialRequestRepo;
pub use project_repo::ProjectRepo;
pub use team_repo::TeamRepo;
