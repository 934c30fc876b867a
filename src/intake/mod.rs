//! Patient intake: the five form modes, their schemas, default tables and
//! submission policies.

pub mod backend;
pub mod catalog;
pub mod forms;
pub mod payload;
pub mod schemas;
pub mod submission;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

pub use backend::{CallCounts, InMemoryBackend};
pub use forms::{defaults, definition, open, register_defaults};
pub use payload::{
    Appointment, AppointmentRequest, AppointmentStatus, CancelAppointmentRequest,
    CreatePatientIdentity, IdentificationDocument, Identity, Payload, PatientRecord,
    PatientRegistration,
};
pub use schemas::resolve;
pub use submission::{
    IntakeSubmission, Navigation, Navigator, PatientBackend, RegistrationContext,
    SubmissionContext, SubmissionPolicy, Submitted, SubmittedRecord,
};

/// Which intake form is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormMode {
    CreatePatient,
    RegisterPatient,
    CreateAppointment,
    ScheduleAppointment,
    CancelAppointment,
}

impl FormMode {
    pub const ALL: [FormMode; 5] = [
        FormMode::CreatePatient,
        FormMode::RegisterPatient,
        FormMode::CreateAppointment,
        FormMode::ScheduleAppointment,
        FormMode::CancelAppointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::CreatePatient => "create-patient",
            FormMode::RegisterPatient => "register-patient",
            FormMode::CreateAppointment => "create-appointment",
            FormMode::ScheduleAppointment => "schedule-appointment",
            FormMode::CancelAppointment => "cancel-appointment",
        }
    }

    pub fn is_appointment(&self) -> bool {
        matches!(
            self,
            FormMode::CreateAppointment
                | FormMode::ScheduleAppointment
                | FormMode::CancelAppointment
        )
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FormMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value.trim())
            .ok_or_else(|| ConfigurationError::InvalidConstraint {
                field: "mode".into(),
                reason: format!("unknown form mode `{value}`"),
            })
    }
}
