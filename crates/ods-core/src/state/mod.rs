//! State management for orders.
//!
//! The state machine decides which status changes are legal. Persistence is
//! the caller's concern: handlers apply transitions to records read through
//! a storage transaction and commit them together with any other effects.

pub mod order;

pub use order::{OrderAction, OrderStateMachine};
