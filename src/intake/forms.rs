//! Field layouts and default tables for the intake forms.

use chrono::{DateTime, Utc};

use crate::config::IntakeConfig;
use crate::errors::ConfigurationError;
use crate::form::{
    FieldDescriptor, FieldValue, FileUploader, FormController, FormDefinition, RadioGroup,
    Renderer, ValueMap,
};
use crate::intake::catalog::{identification_options, physician_options, GENDER_OPTIONS};
use crate::intake::payload::Identity;
use crate::intake::schemas::resolve;
use crate::intake::FormMode;

const PHONE_PLACEHOLDER: &str = "0712345678";

/// Builds the field layout for `mode`.
pub fn definition(mode: FormMode, config: &IntakeConfig) -> FormDefinition {
    match mode {
        FormMode::CreatePatient => FormDefinition::new(mode.as_str(), "Hi there 👋")
            .with_subtitle("Schedule your first appointment")
            .with_submit_label("Get Started")
            .with_fields(identity_fields()),
        FormMode::RegisterPatient => registration(config),
        FormMode::CreateAppointment | FormMode::ScheduleAppointment => {
            let label = if mode == FormMode::CreateAppointment {
                "Create Appointment"
            } else {
                "Schedule Appointment"
            };
            appointment_chrome(mode)
                .with_submit_label(label)
                .with_fields(vec![
                    FieldDescriptor::select("primaryPhysician", physician_options())
                        .with_label("Doctor")
                        .with_placeholder("Select a doctor"),
                    FieldDescriptor::date("schedule")
                        .with_label("Expected appointment date")
                        .with_date_format(config.schedule_date_format.clone())
                        .with_time_select(),
                    FieldDescriptor::multiline("reason")
                        .with_label("Reason for appointment")
                        .with_placeholder("Enter the reason for your appointment"),
                    FieldDescriptor::multiline("note")
                        .with_label("Notes")
                        .with_placeholder("Enter notes"),
                ])
        }
        FormMode::CancelAppointment => appointment_chrome(mode)
            .with_submit_label("Cancel Appointment")
            .destructive()
            .with_fields(vec![FieldDescriptor::multiline("cancellationReason")
                .with_label("Reason for cancellation")
                .with_placeholder("Enter the reason for cancellation")]),
    }
}

fn appointment_chrome(mode: FormMode) -> FormDefinition {
    FormDefinition::new(mode.as_str(), "New Appointment")
        .with_subtitle("Request a new appointment in 10 seconds")
}

fn identity_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name")
            .with_label("Full Name")
            .with_placeholder("Enter your full name")
            .with_icon("/assets/icons/user.svg", "User"),
        FieldDescriptor::text("email")
            .with_label("Email")
            .with_placeholder("petermacharia@gmail.com")
            .with_icon("/assets/icons/email.svg", "email"),
        FieldDescriptor::phone("phone")
            .with_label("Phone Number")
            .with_placeholder(PHONE_PLACEHOLDER),
    ]
}

fn registration(config: &IntakeConfig) -> FormDefinition {
    let mut personal = identity_fields();
    personal.extend([
        FieldDescriptor::date("birthDate")
            .with_label("Date of Birth")
            .with_date_format(config.date_format.clone()),
        FieldDescriptor::skeleton("gender", RadioGroup::renderer(&GENDER_OPTIONS))
            .with_label("Gender"),
        FieldDescriptor::text("address")
            .with_label("Address")
            .with_placeholder("Karen, Nairobi"),
        FieldDescriptor::text("occupation")
            .with_label("Occupation")
            .with_placeholder("Software Developer"),
        FieldDescriptor::text("emergencyContactName")
            .with_label("Emergency contact name")
            .with_placeholder("Guardian's name"),
        FieldDescriptor::phone("emergencyContactNumber")
            .with_label("Emergency contact number")
            .with_placeholder(PHONE_PLACEHOLDER),
    ]);

    let medical = vec![
        FieldDescriptor::select("primaryPhysician", physician_options())
            .with_label("Primary Physician")
            .with_placeholder("Select a physician"),
        FieldDescriptor::text("insuranceProvider")
            .with_label("Insurance provider")
            .with_placeholder("Cytonn Health"),
        FieldDescriptor::text("insurancePolicyNumber")
            .with_label("Insurance policy number")
            .with_placeholder("ABC123456789"),
        FieldDescriptor::multiline("allergies")
            .with_label("Allergies (if any)")
            .with_placeholder("Pollen, Peanuts"),
        FieldDescriptor::multiline("currentMedication")
            .with_label("Current medication (if any)")
            .with_placeholder("Ibuprofen 200mg, aspirin 500mg"),
        FieldDescriptor::multiline("familyMedicalHistory")
            .with_label("Family medical history")
            .with_placeholder("Mother had diabetes, father had hypertension"),
        FieldDescriptor::multiline("pastMedicalHistory")
            .with_label("Past medical history")
            .with_placeholder("Appendicitis, appendectomy"),
    ];

    let identification = vec![
        FieldDescriptor::select("identificationType", identification_options())
            .with_label("Identification type")
            .with_placeholder("Select an identification type"),
        FieldDescriptor::text("identificationNumber")
            .with_label("Identification number")
            .with_placeholder("123456789"),
        FieldDescriptor::skeleton("identificationDocument", FileUploader::renderer())
            .with_label("Scanned copy of identification document"),
    ];

    let consent = vec![
        FieldDescriptor::checkbox("treatmentConsent").with_label("I consent to receive treatment"),
        FieldDescriptor::checkbox("disclosureConsent")
            .with_label("I consent to disclosure of information"),
        FieldDescriptor::checkbox("privacyConsent").with_label("I consent to privacy policy"),
    ];

    FormDefinition::new(FormMode::RegisterPatient.as_str(), "Welcome 👋")
        .with_subtitle("Let us know about yourself")
        .with_submit_label("Get Started")
        .with_section("Personal Information", personal)
        .with_section("Medical Information", medical)
        .with_section("Identification and Verification", identification)
        .with_section("Consent and Privacy", consent)
}

fn blank(values: ValueMap, names: &[&str]) -> ValueMap {
    names
        .iter()
        .fold(values, |values, name| values.with(*name, FieldValue::text("")))
}

/// Default value table for `mode`; `now` seeds every date field.
pub fn defaults(mode: FormMode, now: DateTime<Utc>) -> ValueMap {
    match mode {
        FormMode::CreatePatient => blank(ValueMap::new(), &["name", "email", "phone"]),
        FormMode::RegisterPatient => blank(
            ValueMap::new(),
            &[
                "name",
                "email",
                "phone",
                "address",
                "occupation",
                "emergencyContactName",
                "emergencyContactNumber",
                "primaryPhysician",
                "insuranceProvider",
                "insurancePolicyNumber",
                "allergies",
                "currentMedication",
                "familyMedicalHistory",
                "pastMedicalHistory",
                "identificationNumber",
            ],
        )
        .with("birthDate", FieldValue::Date(now))
        .with("gender", FieldValue::text("Male"))
        .with("identificationType", FieldValue::text("Birth Certificate"))
        .with("identificationDocument", FieldValue::Files(Vec::new()))
        .with("treatmentConsent", FieldValue::Bool(false))
        .with("disclosureConsent", FieldValue::Bool(false))
        .with("privacyConsent", FieldValue::Bool(false)),
        FormMode::CreateAppointment
        | FormMode::ScheduleAppointment
        | FormMode::CancelAppointment => blank(
            ValueMap::new(),
            &["primaryPhysician", "reason", "note", "cancellationReason"],
        )
        .with("schedule", FieldValue::Date(now)),
    }
}

/// Registration defaults pre-filled from an existing identity.
pub fn register_defaults(identity: &Identity, now: DateTime<Utc>) -> ValueMap {
    defaults(FormMode::RegisterPatient, now)
        .with("name", FieldValue::text(identity.name.clone()))
        .with("email", FieldValue::text(identity.email.clone()))
        .with("phone", FieldValue::text(identity.phone.clone()))
}

/// Opens a form session for `mode` with the given default table.
pub fn open(
    mode: FormMode,
    config: &IntakeConfig,
    defaults: ValueMap,
) -> Result<FormController, ConfigurationError> {
    let renderer = Renderer::for_region(&config.default_phone_region)?;
    let controller = FormController::new(definition(mode, config), resolve(mode), defaults)?;
    Ok(controller.with_renderer(renderer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_passes_its_definition_check() {
        let config = IntakeConfig::default();
        let now = Utc::now();
        for mode in FormMode::ALL {
            let controller = open(mode, &config, defaults(mode, now));
            assert!(controller.is_ok(), "{mode} failed: {:?}", controller.err());
        }
    }

    #[test]
    fn unknown_phone_region_is_refused_at_open() {
        let config = IntakeConfig {
            default_phone_region: "ZZ".into(),
            ..IntakeConfig::default()
        };
        let opened = open(
            FormMode::CreatePatient,
            &config,
            defaults(FormMode::CreatePatient, Utc::now()),
        );
        assert!(matches!(
            opened,
            Err(ConfigurationError::InvalidConstraint { ref field, .. }) if field == "default_phone_region"
        ));
    }

    #[test]
    fn cancel_form_shows_only_the_reason() {
        let form = definition(FormMode::CancelAppointment, &IntakeConfig::default());
        let names: Vec<&str> = form.fields().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["cancellationReason"]);
        assert!(form.destructive);
        assert_eq!(form.submit_label, "Cancel Appointment");
    }

    #[test]
    fn registration_sections_follow_layout() {
        let form = definition(FormMode::RegisterPatient, &IntakeConfig::default());
        let titles: Vec<&str> = form
            .sections
            .iter()
            .filter_map(|section| section.title.as_deref())
            .collect();
        assert_eq!(
            titles,
            vec![
                "Personal Information",
                "Medical Information",
                "Identification and Verification",
                "Consent and Privacy",
            ]
        );
    }

    #[test]
    fn register_defaults_take_identity_contact_details() {
        let identity = Identity {
            id: "u-1".into(),
            name: "Amani Njeri".into(),
            email: "amani@example.com".into(),
            phone: "+254712345678".into(),
        };
        let values = register_defaults(&identity, Utc::now());
        assert_eq!(values.text("name"), "Amani Njeri");
        assert_eq!(values.text("gender"), "Male");
        assert!(!values.flag("privacyConsent"));
    }
}
