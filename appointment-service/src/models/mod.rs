pub mod booking;

pub use booking::{Appointment, BookingRequest, MissingFields, Recipient};
