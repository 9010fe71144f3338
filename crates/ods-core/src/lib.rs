//! Core lifecycle engine for the order & delivery service.
//!
//! The engine owns the storage service and the event bus and exposes one
//! handler per resource. Every mutating operation runs inside a single
//! storage transaction: preconditions are checked against the transaction's
//! view, effects are staged, and the whole unit is committed once. Events are
//! published only after the commit succeeded.

pub mod builder;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod seed;
pub mod state;

pub use builder::{BuilderError, ShopBuilder, ShopFactories};
pub use engine::{event_bus::EventBus, ShopEngine};
pub use error::ShopError;
