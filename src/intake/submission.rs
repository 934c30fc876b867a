//! Mode-dependent submission: payload shaping, the collaborator call and the
//! follow-up navigation.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::IntakeConfig;
use crate::errors::{BackendError, ConfigurationError, SubmissionError};
use crate::form::{FormFlow, ValueMap};
use crate::intake::forms::register_defaults;
use crate::intake::payload::{
    Appointment, AppointmentRequest, AppointmentStatus, CancelAppointmentRequest,
    CreatePatientIdentity, IdentificationDocument, Identity, Payload, PatientRecord,
    PatientRegistration,
};
use crate::intake::FormMode;

/// External patient services the forms submit to.
pub trait PatientBackend {
    fn create_patient_identity(
        &mut self,
        data: &CreatePatientIdentity,
    ) -> Result<Identity, BackendError>;

    fn fetch_identity(&mut self, id: &str) -> Result<Identity, BackendError>;

    fn register_patient(
        &mut self,
        data: &PatientRegistration,
    ) -> Result<PatientRecord, BackendError>;

    fn create_appointment(
        &mut self,
        data: &AppointmentRequest,
    ) -> Result<Appointment, BackendError>;

    fn cancel_appointment(
        &mut self,
        data: &CancelAppointmentRequest,
    ) -> Result<Appointment, BackendError>;
}

/// A page change requested after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub delay: Duration,
}

impl Navigation {
    pub fn immediate(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            delay: Duration::ZERO,
        }
    }
}

pub trait Navigator {
    fn navigate(&mut self, navigation: &Navigation);
}

impl Navigator for Vec<Navigation> {
    fn navigate(&mut self, navigation: &Navigation) {
        self.push(navigation.clone());
    }
}

/// Identifiers supplied by the surrounding page, not by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    pub user_id: Option<String>,
    pub patient_id: Option<String>,
    pub appointment_id: Option<String>,
}

impl SubmissionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    pub fn with_appointment(mut self, appointment_id: impl Into<String>) -> Self {
        self.appointment_id = Some(appointment_id.into());
        self
    }
}

/// What the collaborator returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmittedRecord {
    Identity(Identity),
    Patient(PatientRecord),
    Appointment(Appointment),
}

impl SubmittedRecord {
    pub fn id(&self) -> &str {
        match self {
            SubmittedRecord::Identity(identity) => &identity.id,
            SubmittedRecord::Patient(patient) => &patient.id,
            SubmittedRecord::Appointment(appointment) => &appointment.id,
        }
    }
}

/// Outcome of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub payload: Payload,
    pub record: SubmittedRecord,
    pub navigation: Navigation,
}

/// Builds payloads for one form mode and routes them to the right service.
#[derive(Debug, Clone)]
pub struct SubmissionPolicy {
    mode: FormMode,
    user_id: String,
    patient_id: String,
    appointment_id: String,
    redirect_delay: Duration,
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigurationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(ConfigurationError::MissingContext(name))
}

impl SubmissionPolicy {
    /// Checks that `context` carries every identifier `mode` needs.
    pub fn new(
        mode: FormMode,
        context: &SubmissionContext,
        config: &IntakeConfig,
    ) -> Result<Self, ConfigurationError> {
        let mut policy = Self {
            mode,
            user_id: String::new(),
            patient_id: String::new(),
            appointment_id: String::new(),
            redirect_delay: config.registration_redirect_delay(),
        };
        match mode {
            FormMode::CreatePatient => {}
            FormMode::RegisterPatient => {
                policy.user_id = required(&context.user_id, "userId")?;
            }
            FormMode::CreateAppointment | FormMode::ScheduleAppointment => {
                policy.user_id = required(&context.user_id, "userId")?;
                policy.patient_id = required(&context.patient_id, "patientId")?;
            }
            FormMode::CancelAppointment => {
                policy.user_id = required(&context.user_id, "userId")?;
                policy.appointment_id = required(&context.appointment_id, "appointmentId")?;
            }
        }
        Ok(policy)
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Appointment status implied by the mode alone.
    pub fn status(&self) -> AppointmentStatus {
        match self.mode {
            FormMode::ScheduleAppointment => AppointmentStatus::Scheduled,
            FormMode::CancelAppointment => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }

    /// Registration keeps its values on screen until the redirect fires.
    pub fn resets_on_success(&self) -> bool {
        self.mode != FormMode::RegisterPatient
    }

    /// Shapes validated values into the payload for this mode.
    pub fn build(&self, values: &ValueMap) -> Result<Payload, SubmissionError> {
        let payload = match self.mode {
            FormMode::CreatePatient => Payload::CreatePatient(CreatePatientIdentity {
                name: trimmed(values, "name"),
                email: trimmed(values, "email"),
                phone: trimmed(values, "phone"),
            }),
            FormMode::RegisterPatient => {
                Payload::RegisterPatient(Box::new(self.registration(values)?))
            }
            FormMode::CreateAppointment | FormMode::ScheduleAppointment => {
                Payload::Appointment(AppointmentRequest {
                    user_id: self.user_id.clone(),
                    patient_id: self.patient_id.clone(),
                    primary_physician: trimmed(values, "primaryPhysician"),
                    schedule: date(values, "schedule")?,
                    reason: trimmed(values, "reason"),
                    note: values.optional_text("note"),
                    status: self.status(),
                })
            }
            FormMode::CancelAppointment => Payload::CancelAppointment(CancelAppointmentRequest {
                appointment_id: self.appointment_id.clone(),
                user_id: self.user_id.clone(),
                status: self.status(),
                cancellation_reason: trimmed(values, "cancellationReason"),
            }),
        };
        tracing::debug!(mode = %self.mode, payload = payload.kind(), "payload built");
        Ok(payload)
    }

    fn registration(&self, values: &ValueMap) -> Result<PatientRegistration, SubmissionError> {
        let identification_document = values
            .files("identificationDocument")
            .first()
            .map(IdentificationDocument::from);
        Ok(PatientRegistration {
            user_id: self.user_id.clone(),
            name: trimmed(values, "name"),
            email: trimmed(values, "email"),
            phone: trimmed(values, "phone"),
            birth_date: date(values, "birthDate")?,
            gender: trimmed(values, "gender"),
            address: trimmed(values, "address"),
            occupation: values.optional_text("occupation"),
            emergency_contact_name: trimmed(values, "emergencyContactName"),
            emergency_contact_number: trimmed(values, "emergencyContactNumber"),
            primary_physician: trimmed(values, "primaryPhysician"),
            insurance_provider: values.optional_text("insuranceProvider"),
            insurance_policy_number: values.optional_text("insurancePolicyNumber"),
            allergies: values.optional_text("allergies"),
            current_medication: values.optional_text("currentMedication"),
            family_medical_history: values.optional_text("familyMedicalHistory"),
            past_medical_history: values.optional_text("pastMedicalHistory"),
            identification_type: trimmed(values, "identificationType"),
            identification_number: trimmed(values, "identificationNumber"),
            identification_document,
            treatment_consent: values.flag("treatmentConsent"),
            disclosure_consent: values.flag("disclosureConsent"),
            privacy_consent: values.flag("privacyConsent"),
        })
    }

    /// Hands `payload` to the matching collaborator call.
    pub fn execute<B: PatientBackend + ?Sized>(
        &self,
        backend: &mut B,
        payload: &Payload,
    ) -> Result<SubmittedRecord, SubmissionError> {
        tracing::info!(mode = %self.mode, payload = payload.kind(), "calling patient service");
        let record = match payload {
            Payload::CreatePatient(data) => {
                SubmittedRecord::Identity(backend.create_patient_identity(data)?)
            }
            Payload::RegisterPatient(data) => {
                SubmittedRecord::Patient(backend.register_patient(data)?)
            }
            Payload::Appointment(data) => {
                SubmittedRecord::Appointment(backend.create_appointment(data)?)
            }
            Payload::CancelAppointment(data) => {
                SubmittedRecord::Appointment(backend.cancel_appointment(data)?)
            }
        };
        Ok(record)
    }

    /// Where to go once `record` has been stored.
    pub fn navigation(&self, record: &SubmittedRecord) -> Navigation {
        match self.mode {
            FormMode::CreatePatient => {
                Navigation::immediate(format!("/patients/{}/register", record.id()))
            }
            FormMode::RegisterPatient => Navigation {
                path: format!("/patients/{}/new-appointment", self.user_id),
                delay: self.redirect_delay,
            },
            FormMode::CreateAppointment | FormMode::ScheduleAppointment => {
                Navigation::immediate(format!(
                    "/patients/{}/new-appointment/success?appointmentId={}",
                    self.user_id,
                    record.id()
                ))
            }
            FormMode::CancelAppointment => Navigation::immediate(format!(
                "/patients/{}/appointments?cancelled={}",
                self.user_id, self.appointment_id
            )),
        }
    }
}

fn trimmed(values: &ValueMap, name: &str) -> String {
    values.text(name).trim().to_string()
}

fn date(values: &ValueMap, name: &str) -> Result<DateTime<Utc>, SubmissionError> {
    values.date(name).ok_or_else(|| SubmissionError::Payload {
        field: name.to_string(),
        reason: "expected a date value".into(),
    })
}

/// Connects a [`SubmissionPolicy`] to a backend and a navigator for one
/// controller submit.
pub struct IntakeSubmission<'a, B: ?Sized, N: ?Sized> {
    policy: SubmissionPolicy,
    backend: &'a mut B,
    navigator: &'a mut N,
}

impl<'a, B, N> IntakeSubmission<'a, B, N>
where
    B: PatientBackend + ?Sized,
    N: Navigator + ?Sized,
{
    pub fn new(policy: SubmissionPolicy, backend: &'a mut B, navigator: &'a mut N) -> Self {
        Self {
            policy,
            backend,
            navigator,
        }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }
}

impl<B, N> FormFlow for IntakeSubmission<'_, B, N>
where
    B: PatientBackend + ?Sized,
    N: Navigator + ?Sized,
{
    type Output = Submitted;

    fn commit(&mut self, values: &ValueMap) -> Result<Submitted, SubmissionError> {
        let payload = self.policy.build(values)?;
        let record = self.policy.execute(&mut *self.backend, &payload)?;
        let navigation = self.policy.navigation(&record);
        Ok(Submitted {
            payload,
            record,
            navigation,
        })
    }

    fn reset_on_success(&self) -> bool {
        self.policy.resets_on_success()
    }

    fn after_success(&mut self, output: &Submitted) {
        tracing::info!(
            mode = %self.policy.mode(),
            path = %output.navigation.path,
            "navigating after submit"
        );
        self.navigator.navigate(&output.navigation);
    }
}

/// Everything the registration form needs before it is shown.
#[derive(Debug, Clone)]
pub struct RegistrationContext {
    pub identity: Identity,
    pub defaults: ValueMap,
    pub context: SubmissionContext,
}

impl RegistrationContext {
    /// Fetches the identity for `user_id` and pre-fills the registration defaults.
    pub fn load<B: PatientBackend + ?Sized>(
        backend: &mut B,
        user_id: &str,
    ) -> Result<Self, BackendError> {
        let identity = backend.fetch_identity(user_id)?;
        tracing::debug!(user = %identity.id, "identity loaded for registration");
        Ok(Self {
            defaults: register_defaults(&identity, Utc::now()),
            context: SubmissionContext::new().with_user(identity.id.clone()),
            identity,
        })
    }
}
