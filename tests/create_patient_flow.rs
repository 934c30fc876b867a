mod common;

use intake_forms::errors::{BackendError, SubmissionError};
use intake_forms::form::{FormStatus, SubmitReport, GENERIC_FAILURE_MESSAGE};
use intake_forms::intake::{
    Appointment, AppointmentRequest, CancelAppointmentRequest, CreatePatientIdentity, FormMode,
    Identity, InMemoryBackend, IntakeSubmission, Navigation, PatientBackend, PatientRecord,
    PatientRegistration, Payload, SubmissionContext, SubmissionPolicy,
};

/// Identity service that always hands out the same id.
#[derive(Default)]
struct FixedIdBackend {
    received: Vec<CreatePatientIdentity>,
}

impl PatientBackend for FixedIdBackend {
    fn create_patient_identity(
        &mut self,
        data: &CreatePatientIdentity,
    ) -> Result<Identity, BackendError> {
        self.received.push(data.clone());
        Ok(Identity {
            id: "42".into(),
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
        })
    }

    fn fetch_identity(&mut self, id: &str) -> Result<Identity, BackendError> {
        Err(BackendError::NotFound(id.to_string()))
    }

    fn register_patient(
        &mut self,
        _data: &PatientRegistration,
    ) -> Result<PatientRecord, BackendError> {
        Err(BackendError::Unavailable("not used".into()))
    }

    fn create_appointment(
        &mut self,
        _data: &AppointmentRequest,
    ) -> Result<Appointment, BackendError> {
        Err(BackendError::Unavailable("not used".into()))
    }

    fn cancel_appointment(
        &mut self,
        _data: &CancelAppointmentRequest,
    ) -> Result<Appointment, BackendError> {
        Err(BackendError::Unavailable("not used".into()))
    }
}

fn policy() -> SubmissionPolicy {
    SubmissionPolicy::new(
        FormMode::CreatePatient,
        &SubmissionContext::new(),
        &common::config(),
    )
    .expect("create-patient needs no context")
}

#[test]
fn new_identity_id_drives_navigation() {
    let mut controller = common::filled(
        FormMode::CreatePatient,
        &common::valid_values(FormMode::CreatePatient),
    );
    let mut backend = FixedIdBackend::default();
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy(), &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    let SubmitReport::Succeeded(submitted) = report else {
        panic!("expected a successful submit");
    };
    assert_eq!(controller.status(), FormStatus::SubmitSucceeded);
    assert_eq!(submitted.record.id(), "42");
    assert_eq!(navigations.len(), 1);
    assert!(navigations[0].path.contains("42"));
    assert_eq!(navigations[0].path, "/patients/42/register");
    assert!(navigations[0].delay.is_zero());
    assert_eq!(
        backend.received,
        vec![CreatePatientIdentity {
            name: "Jo".into(),
            email: "jo@x.com".into(),
            phone: "0712345678".into(),
        }]
    );
    assert!(matches!(submitted.payload, Payload::CreatePatient(_)));
    assert!(!controller.has_changes());
}

#[test]
fn phone_typed_through_widget_is_normalized() {
    let controller = common::filled(
        FormMode::CreatePatient,
        &common::valid_values(FormMode::CreatePatient),
    );
    {
        let mut widget = controller.render("phone").expect("phone field");
        widget.input("0712 345 678").expect("accepted");
    }
    assert_eq!(controller.values().text("phone"), "+254712345678");
}

#[test]
fn invalid_email_blocks_submit() {
    let values = common::valid_values(FormMode::CreatePatient)
        .with("email", intake_forms::form::FieldValue::text("jo@x"));
    let mut controller = common::filled(FormMode::CreatePatient, &values);
    let mut backend = FixedIdBackend::default();
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy(), &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    let SubmitReport::Invalid(errors) = report else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);
    assert_eq!(errors.get("email"), Some("Invalid email address"));
    assert!(backend.received.is_empty());
    assert!(navigations.is_empty());
}

#[test]
fn service_failure_keeps_input_and_shows_generic_message() {
    let values = common::valid_values(FormMode::CreatePatient);
    let mut controller = common::filled(FormMode::CreatePatient, &values);
    let before = controller.values();
    let mut backend = InMemoryBackend::new();
    backend.fail_next(BackendError::Unavailable("timeout".into()));
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy(), &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    assert!(matches!(
        report,
        SubmitReport::Failed(SubmissionError::Backend(BackendError::Unavailable(_)))
    ));
    assert_eq!(controller.status(), FormStatus::Editing);
    assert_eq!(controller.values(), before);
    assert_eq!(controller.last_failure(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(navigations.is_empty());

    let retry = {
        let mut flow = IntakeSubmission::new(policy(), &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };
    assert!(retry.is_success());
    assert_eq!(backend.calls().create_patient_identity, 2);
    assert_eq!(navigations.len(), 1);
}
