//! gRPC service implementations.
//!
//! ## Structure
//!
//! - [`handler`] - checklist service entry point (`ChecklistService`).
//! - [`greeter`] - greeting service (`GreeterService`).

pub mod greeter;
pub mod handler;
