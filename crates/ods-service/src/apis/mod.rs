//! Route handlers grouped by resource.
//!
//! Handlers only translate between HTTP and the engine: they extract the
//! caller and the request body, call one engine operation and wrap its result
//! or error.

pub mod auth;
pub mod delivery;
pub mod json;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
