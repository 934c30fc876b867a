mod common;

use intake_forms::errors::ConfigurationError;
use intake_forms::form::{FieldValue, FormStatus, SubmitReport};
use intake_forms::intake::{
    defaults, open, AppointmentRequest, AppointmentStatus, FormMode, InMemoryBackend,
    IntakeSubmission, Navigation, PatientBackend, Payload, SubmissionContext, SubmissionPolicy,
};

fn context() -> SubmissionContext {
    SubmissionContext::new().with_user("u-1").with_patient("p-1")
}

fn seed_appointment(backend: &mut InMemoryBackend) -> String {
    backend
        .create_appointment(&AppointmentRequest {
            user_id: "u-1".into(),
            patient_id: "p-1".into(),
            primary_physician: "Jane Powell".into(),
            schedule: common::session_start(),
            reason: "Follow-up".into(),
            note: None,
            status: AppointmentStatus::Scheduled,
        })
        .expect("seeded")
        .id
}

#[test]
fn missing_physician_never_reaches_the_service() {
    let values = common::valid_values(FormMode::ScheduleAppointment)
        .with("primaryPhysician", FieldValue::text(""));
    let mut controller = common::filled(FormMode::ScheduleAppointment, &values);
    let policy = SubmissionPolicy::new(FormMode::ScheduleAppointment, &context(), &common::config())
        .expect("context complete");
    let mut backend = InMemoryBackend::new();
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy, &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    let SubmitReport::Invalid(errors) = report else {
        panic!("physician is required");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["primaryPhysician"]);
    assert_eq!(errors.get("primaryPhysician"), Some("Select at least one doctor"));
    assert_eq!(backend.calls().total(), 0);
    assert!(navigations.is_empty());
    assert_eq!(controller.status(), FormStatus::Editing);
}

#[test]
fn scheduling_sends_scheduled_status_and_resets() {
    let mut controller = common::filled(
        FormMode::ScheduleAppointment,
        &common::valid_values(FormMode::ScheduleAppointment)
            .with("note", FieldValue::text("Prefers mornings")),
    );
    let policy = SubmissionPolicy::new(FormMode::ScheduleAppointment, &context(), &common::config())
        .expect("context complete");
    let mut backend = InMemoryBackend::new();
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy, &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    let SubmitReport::Succeeded(submitted) = report else {
        panic!("schedule should succeed");
    };
    let Payload::Appointment(request) = &submitted.payload else {
        panic!("expected appointment payload");
    };
    assert_eq!(request.status, AppointmentStatus::Scheduled);
    assert_eq!(request.patient_id, "p-1");
    assert_eq!(request.primary_physician, "Leila Cameron");
    assert_eq!(request.schedule, common::session_start());
    assert_eq!(request.note.as_deref(), Some("Prefers mornings"));

    let id = submitted.record.id().to_string();
    assert_eq!(
        navigations[0].path,
        format!("/patients/u-1/new-appointment/success?appointmentId={id}")
    );
    assert_eq!(controller.values(), controller.defaults().clone());
}

#[test]
fn creating_defaults_to_pending_status() {
    let mut controller = common::filled(
        FormMode::CreateAppointment,
        &common::valid_values(FormMode::CreateAppointment),
    );
    let policy = SubmissionPolicy::new(FormMode::CreateAppointment, &context(), &common::config())
        .expect("context complete");
    let mut backend = InMemoryBackend::new();
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy, &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    let SubmitReport::Succeeded(submitted) = report else {
        panic!("create should succeed");
    };
    let stored = backend
        .appointment(submitted.record.id())
        .expect("stored appointment");
    assert_eq!(stored.status, AppointmentStatus::Pending);
    assert!(stored.note.is_none());
}

#[test]
fn cancel_marks_appointment_cancelled_by_id() {
    let mut backend = InMemoryBackend::new();
    let appointment_id = seed_appointment(&mut backend);

    let mut controller = common::filled(
        FormMode::CancelAppointment,
        &common::valid_values(FormMode::CancelAppointment),
    );
    let context = SubmissionContext::new()
        .with_user("u-1")
        .with_appointment(appointment_id.clone());
    let policy = SubmissionPolicy::new(FormMode::CancelAppointment, &context, &common::config())
        .expect("context complete");
    let mut navigations: Vec<Navigation> = Vec::new();

    let report = {
        let mut flow = IntakeSubmission::new(policy, &mut backend, &mut navigations);
        controller.submit(&mut flow)
    };

    assert!(report.is_success());
    assert_eq!(backend.calls().cancel_appointment, 1);
    assert_eq!(backend.calls().create_appointment, 1);
    let request = backend.last_cancel().expect("cancel call made");
    assert_eq!(request.appointment_id, appointment_id);
    assert_eq!(request.status, AppointmentStatus::Cancelled);
    assert_eq!(request.cancellation_reason, "Patient unavailable");

    let stored = backend.appointment(&appointment_id).expect("still stored");
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
    assert_eq!(
        navigations[0].path,
        format!("/patients/u-1/appointments?cancelled={appointment_id}")
    );
    assert_eq!(controller.values(), controller.defaults().clone());
}

#[test]
fn cancel_needs_an_appointment_id() {
    let error = SubmissionPolicy::new(
        FormMode::CancelAppointment,
        &SubmissionContext::new().with_user("u-1"),
        &common::config(),
    )
    .unwrap_err();
    assert_eq!(error, ConfigurationError::MissingContext("appointmentId"));
}

#[test]
fn cancel_form_renders_only_the_reason_field() {
    let controller = open(
        FormMode::CancelAppointment,
        &common::config(),
        defaults(FormMode::CancelAppointment, common::session_start()),
    )
    .expect("form opens");
    assert!(controller.render("cancellationReason").is_ok());
    assert_eq!(
        controller.render("primaryPhysician").err(),
        Some(ConfigurationError::UnknownField("primaryPhysician".into()))
    );
    assert!(controller.definition().destructive);
}
