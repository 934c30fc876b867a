//! In-process stand-in for the patient services.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::errors::BackendError;
use crate::intake::payload::{
    Appointment, AppointmentRequest, CancelAppointmentRequest, CreatePatientIdentity, Identity,
    PatientRecord, PatientRegistration,
};
use crate::intake::submission::PatientBackend;

/// Number of times each service call was made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_patient_identity: usize,
    pub fetch_identity: usize,
    pub register_patient: usize,
    pub create_appointment: usize,
    pub cancel_appointment: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.create_patient_identity
            + self.fetch_identity
            + self.register_patient
            + self.create_appointment
            + self.cancel_appointment
    }
}

/// Keeps identities, patients and appointments in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    identities: BTreeMap<String, Identity>,
    patients: BTreeMap<String, PatientRegistration>,
    appointments: BTreeMap<String, Appointment>,
    calls: CallCounts,
    pending_failure: Option<BackendError>,
    last_cancel: Option<CancelAppointmentRequest>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&mut self, error: BackendError) {
        self.pending_failure = Some(error);
    }

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    pub fn identity(&self, id: &str) -> Option<&Identity> {
        self.identities.get(id)
    }

    pub fn patient(&self, id: &str) -> Option<&PatientRegistration> {
        self.patients.get(id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.get(id)
    }

    pub fn appointments(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.values()
    }

    pub fn last_cancel(&self) -> Option<&CancelAppointmentRequest> {
        self.last_cancel.as_ref()
    }

    fn take_failure(&mut self) -> Result<(), BackendError> {
        match self.pending_failure.take() {
            Some(error) => {
                tracing::debug!(error = %error, "injected service failure");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl PatientBackend for InMemoryBackend {
    fn create_patient_identity(
        &mut self,
        data: &CreatePatientIdentity,
    ) -> Result<Identity, BackendError> {
        self.calls.create_patient_identity += 1;
        self.take_failure()?;
        if let Some(existing) = self
            .identities
            .values()
            .find(|identity| identity.email.eq_ignore_ascii_case(&data.email))
        {
            return Ok(existing.clone());
        }
        let identity = Identity {
            id: new_id(),
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
        };
        self.identities
            .insert(identity.id.clone(), identity.clone());
        Ok(identity)
    }

    fn fetch_identity(&mut self, id: &str) -> Result<Identity, BackendError> {
        self.calls.fetch_identity += 1;
        self.take_failure()?;
        self.identities
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("identity {id}")))
    }

    fn register_patient(
        &mut self,
        data: &PatientRegistration,
    ) -> Result<PatientRecord, BackendError> {
        self.calls.register_patient += 1;
        self.take_failure()?;
        if !self.identities.contains_key(&data.user_id) {
            return Err(BackendError::NotFound(format!("identity {}", data.user_id)));
        }
        let id = new_id();
        self.patients.insert(id.clone(), data.clone());
        Ok(PatientRecord {
            id,
            user_id: data.user_id.clone(),
            name: data.name.clone(),
        })
    }

    fn create_appointment(
        &mut self,
        data: &AppointmentRequest,
    ) -> Result<Appointment, BackendError> {
        self.calls.create_appointment += 1;
        self.take_failure()?;
        let appointment = Appointment {
            id: new_id(),
            user_id: data.user_id.clone(),
            patient_id: data.patient_id.clone(),
            primary_physician: data.primary_physician.clone(),
            schedule: data.schedule,
            reason: data.reason.clone(),
            note: data.note.clone(),
            status: data.status,
            cancellation_reason: None,
        };
        self.appointments
            .insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    fn cancel_appointment(
        &mut self,
        data: &CancelAppointmentRequest,
    ) -> Result<Appointment, BackendError> {
        self.calls.cancel_appointment += 1;
        self.take_failure()?;
        self.last_cancel = Some(data.clone());
        let appointment = self
            .appointments
            .get_mut(&data.appointment_id)
            .ok_or_else(|| BackendError::NotFound(format!("appointment {}", data.appointment_id)))?;
        if appointment.user_id != data.user_id {
            return Err(BackendError::Rejected(
                "appointment belongs to another user".into(),
            ));
        }
        appointment.status = data.status;
        appointment.cancellation_reason = Some(data.cancellation_reason.clone());
        Ok(appointment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::payload::AppointmentStatus;
    use chrono::Utc;

    fn identity_request() -> CreatePatientIdentity {
        CreatePatientIdentity {
            name: "Jo".into(),
            email: "jo@x.com".into(),
            phone: "+254712345678".into(),
        }
    }

    #[test]
    fn same_email_returns_existing_identity() {
        let mut backend = InMemoryBackend::new();
        let first = backend.create_patient_identity(&identity_request()).unwrap();
        let second = backend.create_patient_identity(&identity_request()).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.calls().create_patient_identity, 2);
    }

    #[test]
    fn injected_failure_applies_once() {
        let mut backend = InMemoryBackend::new();
        backend.fail_next(BackendError::Unavailable("offline".into()));
        assert!(backend.create_patient_identity(&identity_request()).is_err());
        assert!(backend.create_patient_identity(&identity_request()).is_ok());
    }

    #[test]
    fn cancel_marks_existing_appointment() {
        let mut backend = InMemoryBackend::new();
        let appointment = backend
            .create_appointment(&AppointmentRequest {
                user_id: "u-1".into(),
                patient_id: "p-1".into(),
                primary_physician: "Jane Powell".into(),
                schedule: Utc::now(),
                reason: "Checkup".into(),
                note: None,
                status: AppointmentStatus::Pending,
            })
            .unwrap();

        let cancelled = backend
            .cancel_appointment(&CancelAppointmentRequest {
                appointment_id: appointment.id.clone(),
                user_id: "u-1".into(),
                status: AppointmentStatus::Cancelled,
                cancellation_reason: "Travelling".into(),
            })
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Travelling"));

        let unknown = backend.cancel_appointment(&CancelAppointmentRequest {
            appointment_id: "nope".into(),
            user_id: "u-1".into(),
            status: AppointmentStatus::Cancelled,
            cancellation_reason: "Travelling".into(),
        });
        assert!(matches!(unknown, Err(BackendError::NotFound(_))));
    }
}
