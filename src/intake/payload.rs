//! Payload shapes handed to the patient services.
//!
//! Field names follow the collaborator contract exactly, so every type here
//! serializes in camelCase.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::FileAttachment;

/// Contact details sent when a patient first signs up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// An identity as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Uploaded identification document, packaged as a named blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationDocument {
    pub blob_file: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl From<&FileAttachment> for IdentificationDocument {
    fn from(file: &FileAttachment) -> Self {
        Self {
            blob_file: file.bytes.clone(),
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
        }
    }
}

/// Full patient record submitted by the registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: DateTime<Utc>,
    pub gender: String,
    pub address: String,
    pub occupation: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification_type: String,
    pub identification_number: String,
    pub identification_document: Option<IdentificationDocument>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// A stored patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create or schedule an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub user_id: String,
    #[serde(rename = "patient")]
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

/// Request to cancel an existing appointment by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    pub appointment_id: String,
    pub user_id: String,
    pub status: AppointmentStatus,
    pub cancellation_reason: String,
}

/// An appointment as stored by the scheduling service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "patient")]
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
}

/// Payload built for one submit attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Payload {
    CreatePatient(CreatePatientIdentity),
    RegisterPatient(Box<PatientRegistration>),
    Appointment(AppointmentRequest),
    CancelAppointment(CancelAppointmentRequest),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::CreatePatient(_) => "create-patient",
            Payload::RegisterPatient(_) => "register-patient",
            Payload::Appointment(_) => "appointment",
            Payload::CancelAppointment(_) => "cancel-appointment",
        }
    }
}
