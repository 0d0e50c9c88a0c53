//! Member Registry module.
//!
//! Owns the `Member` entities and the one piece of domain behavior in the
//! system: the status lifecycle (Current ↔ Ex-Member) plus email
//! canonicalization. The HTTP layer is a thin adapter over the domain
//! service, serving server-rendered pages with htmx partial updates.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
