//! service-core: Shared infrastructure for the appointment services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

