//! Booking payload, its validated form, and the two notification templates.

use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Inbound booking payload.
///
/// Every field is optional at the parsing stage so that absent, `null`, and
/// non-text values all surface as the same validation failure instead of a
/// JSON rejection.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub patient_name: Option<String>,

    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub patient_phone: Option<String>,

    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub doctor_name: Option<String>,

    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub doctor_phone: Option<String>,

    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub appointment_date: Option<String>,

    #[serde(default, deserialize_with = "text_field")]
    #[validate(required, length(min = 1))]
    pub appointment_time: Option<String>,
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}

/// One or more required booking fields were absent or empty.
#[derive(Debug, Default, Error)]
#[error("Missing required fields")]
pub struct MissingFields {
    pub fields: Vec<String>,
}

impl From<ValidationErrors> for MissingFields {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        Self { fields }
    }
}

impl BookingRequest {
    /// Check all six fields at once and produce the appointment to notify about.
    pub fn into_appointment(self) -> Result<Appointment, MissingFields> {
        self.validate()?;

        match (
            self.patient_name,
            self.patient_phone,
            self.doctor_name,
            self.doctor_phone,
            self.appointment_date,
            self.appointment_time,
        ) {
            (
                Some(patient_name),
                Some(patient_phone),
                Some(doctor_name),
                Some(doctor_phone),
                Some(date),
                Some(time),
            ) => Ok(Appointment {
                patient_name,
                patient_phone,
                doctor_name,
                doctor_phone,
                date,
                time,
            }),
            _ => Err(MissingFields::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_name: String,
    pub doctor_phone: String,
    pub date: String,
    pub time: String,
}

impl Appointment {
    pub fn patient_message(&self) -> String {
        format!(
            "Hi {}, your appointment with Dr. {} is confirmed for {} at {}.",
            self.patient_name, self.doctor_name, self.date, self.time
        )
    }

    pub fn doctor_message(&self) -> String {
        format!(
            "Dr. {}, you have a new appointment with {} on {} at {}.",
            self.doctor_name, self.patient_name, self.date, self.time
        )
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Patient,
    Doctor,
}

impl Recipient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recipient::Patient => "patient",
            Recipient::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
