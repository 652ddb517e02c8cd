//! HTTP handlers for appointment-service.

pub mod booking;
pub mod health;

pub use booking::book_appointment;
pub use health::{health_check, liveness, metrics_endpoint, not_found, readiness_check};
