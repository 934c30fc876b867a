use chrono::Utc;
use intake_forms::{
    config::IntakeConfig,
    form::FieldValue,
    init,
    intake::{
        defaults, open, FormMode, InMemoryBackend, IntakeSubmission, Navigation,
        SubmissionContext, SubmissionPolicy,
    },
};

#[test]
fn create_patient_smoke() {
    init();

    let config = IntakeConfig::default();
    let mut controller = open(
        FormMode::CreatePatient,
        &config,
        defaults(FormMode::CreatePatient, Utc::now()),
    )
    .unwrap();
    controller.set_value("name", FieldValue::text("Jo")).unwrap();
    controller
        .set_value("email", FieldValue::text("jo@x.com"))
        .unwrap();
    controller
        .set_value("phone", FieldValue::text("0712345678"))
        .unwrap();

    let policy =
        SubmissionPolicy::new(FormMode::CreatePatient, &SubmissionContext::new(), &config)
            .unwrap();
    let mut backend = InMemoryBackend::new();
    let mut navigations: Vec<Navigation> = Vec::new();
    let mut flow = IntakeSubmission::new(policy, &mut backend, &mut navigations);

    assert!(controller.submit(&mut flow).is_success());
    assert_eq!(backend.calls().create_patient_identity, 1);
    assert_eq!(navigations.len(), 1);
}
