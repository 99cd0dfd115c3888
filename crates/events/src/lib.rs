//! Roofline domain event infrastructure.
//!
//! The workflow facade publishes a [`DomainEvent`] for every applied
//! mutation. This crate provides:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the canonical event envelope, with typed constructors
//!   for every workflow event the core emits.
//! - [`EventPersistence`] -- background service that durably writes every
//!   event to the `events` table, where the external notification
//!   collaborator drains them.

pub mod bus;
pub mod persistence;

pub use bus::{DomainEvent, EventBus};
pub use persistence::EventPersistence;
