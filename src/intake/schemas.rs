//! Validation schema for each intake form mode.

use crate::form::{Rule, Schema};
use crate::intake::catalog::{GENDER_OPTIONS, IDENTIFICATION_TYPES};
use crate::intake::FormMode;

const NAME_MESSAGE: &str = "Name must be at least 2 characters";
const EMAIL_MESSAGE: &str = "Invalid email address";
const PHONE_MESSAGE: &str = "Invalid phone number";
const PHYSICIAN_MESSAGE: &str = "Select at least one doctor";
const REASON_MESSAGE: &str = "Reason must be at least 2 characters";
const PHONE_MIN_DIGITS: usize = 10;

/// Returns the rules that apply to `mode`.
pub fn resolve(mode: FormMode) -> Schema {
    match mode {
        FormMode::CreatePatient => identity_rules(Schema::new(mode.as_str())),
        FormMode::RegisterPatient => registration(),
        FormMode::CreateAppointment | FormMode::ScheduleAppointment => {
            Schema::new(mode.as_str())
                .field("primaryPhysician", Rule::required_text(2, PHYSICIAN_MESSAGE))
                .field("schedule", Rule::date("Select an appointment date and time"))
                .field("reason", Rule::bounded_text(2, 500, REASON_MESSAGE))
                .field("note", Rule::optional_text())
        }
        FormMode::CancelAppointment => Schema::new(mode.as_str())
            .field("cancellationReason", Rule::bounded_text(2, 500, REASON_MESSAGE)),
    }
}

fn identity_rules(schema: Schema) -> Schema {
    schema
        .field("name", Rule::bounded_text(2, 50, NAME_MESSAGE))
        .field("email", Rule::email(EMAIL_MESSAGE))
        .field("phone", Rule::phone(PHONE_MIN_DIGITS, PHONE_MESSAGE))
}

fn registration() -> Schema {
    identity_rules(Schema::new(FormMode::RegisterPatient.as_str()))
        .field("birthDate", Rule::date("Date of birth is required"))
        .field("gender", Rule::one_of(GENDER_OPTIONS, "Select a gender"))
        .field(
            "address",
            Rule::bounded_text(5, 500, "Address must be at least 5 characters"),
        )
        .field("occupation", Rule::optional_text())
        .field(
            "emergencyContactName",
            Rule::bounded_text(2, 50, "Contact name must be at least 2 characters"),
        )
        .field(
            "emergencyContactNumber",
            Rule::phone(PHONE_MIN_DIGITS, PHONE_MESSAGE),
        )
        .field("primaryPhysician", Rule::required_text(2, PHYSICIAN_MESSAGE))
        .field("insuranceProvider", Rule::optional_text())
        .field("insurancePolicyNumber", Rule::optional_text())
        .field("allergies", Rule::optional_text())
        .field("currentMedication", Rule::optional_text())
        .field("familyMedicalHistory", Rule::optional_text())
        .field("pastMedicalHistory", Rule::optional_text())
        .field(
            "identificationType",
            Rule::one_of(IDENTIFICATION_TYPES, "Select an identification type"),
        )
        .field(
            "identificationNumber",
            Rule::required_text(1, "Identification number is required"),
        )
        .field("identificationDocument", Rule::Files)
        .field(
            "treatmentConsent",
            Rule::must_be_true("You must consent to treatment in order to proceed"),
        )
        .field(
            "disclosureConsent",
            Rule::must_be_true("You must consent to disclosure in order to proceed"),
        )
        .field(
            "privacyConsent",
            Rule::must_be_true("You must consent to privacy in order to proceed"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_requires_only_the_cancellation_reason() {
        let schema = resolve(FormMode::CancelAppointment);
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["cancellationReason"]
        );
    }

    #[test]
    fn schedule_and_create_share_rules() {
        for mode in [FormMode::CreateAppointment, FormMode::ScheduleAppointment] {
            let schema = resolve(mode);
            assert_eq!(
                schema.required_fields().collect::<Vec<_>>(),
                vec!["primaryPhysician", "schedule", "reason"]
            );
            assert!(schema.rule("note").is_some_and(|rule| rule.is_optional()));
            assert!(schema.rule("cancellationReason").is_none());
        }
    }

    #[test]
    fn registration_optional_fields_match_intake_policy() {
        let schema = resolve(FormMode::RegisterPatient);
        let optional: Vec<&str> = schema
            .field_names()
            .filter(|name| !schema.required_fields().any(|required| required == *name))
            .collect();
        assert_eq!(
            optional,
            vec![
                "occupation",
                "insuranceProvider",
                "insurancePolicyNumber",
                "allergies",
                "currentMedication",
                "familyMedicalHistory",
                "pastMedicalHistory",
                "identificationDocument",
            ]
        );
    }
}
