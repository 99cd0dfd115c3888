pub mod event;
pub mod material;
pub mod planning;
pub mod project;
pub mod team;
