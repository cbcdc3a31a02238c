//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod aggregate;
pub mod diagnose;
pub mod dispatch_specialists;
