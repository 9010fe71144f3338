//! Common types module for the order & delivery service.
//!
//! This module defines the domain records, API payloads and configuration
//! validation primitives shared by every crate in the workspace. Keeping them
//! in one place guarantees the HTTP layer, the lifecycle engine and the storage
//! layer all agree on the wire format.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Caller identity and role checks.
pub mod auth;
/// Delivery tracking records.
pub mod delivery;
/// Lifecycle events published after committed transitions.
pub mod events;
/// Orders, order lines and the order status enum.
pub mod order;
/// Payment records.
pub mod payment;
/// Catalogue products and their update DTOs.
pub mod product;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage namespaces.
pub mod storage;
/// Users and roles.
pub mod user;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use api::*;
pub use auth::*;
pub use delivery::*;
pub use events::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use registry::*;
pub use storage::*;
pub use user::*;
pub use validation::*;

/// Identifier type used for every persisted record.
pub type RecordId = u64;
