//! appointment-service: books an appointment and notifies patient and doctor.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
