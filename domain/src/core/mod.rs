//! Core domain concepts shared across all subdomains.
//!
//! - [`case::CaseRequest`] - a validated clinical case submitted to the panel
//! - [`specialist::Specialist`] - the closed set of panel members
//! - [`endpoint::Endpoint`] / [`endpoint::ModelParams`] - where and how a seat is called
//! - [`error::DomainError`] / [`error::FailureKind`] - domain errors and failure taxonomy

pub mod case;
pub mod endpoint;
pub mod error;
pub mod specialist;
