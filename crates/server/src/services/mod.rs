//! Business-logic services.
//!
//! Services orchestrate repositories and never touch HTTP types; route
//! handlers map their errors onto responses.

pub mod auth;
pub mod orders;
