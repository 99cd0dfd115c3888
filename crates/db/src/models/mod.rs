//! Entity models and DTOs, one module per table.

pub mod event;
pub mod material_request;
pub mod project;
pub mod team;
