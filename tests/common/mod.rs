#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use intake_forms::config::IntakeConfig;
use intake_forms::form::{FieldValue, FormController, ValueMap};
use intake_forms::intake::{defaults, open, FormMode};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory usable as an application home.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Configuration with no redirect delay, so flows run instantly.
pub fn config() -> IntakeConfig {
    IntakeConfig {
        registration_redirect_delay_ms: 0,
        ..IntakeConfig::default()
    }
}

pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap()
}

/// Values that satisfy every rule of `mode`.
pub fn valid_values(mode: FormMode) -> ValueMap {
    let values = defaults(mode, session_start());
    match mode {
        FormMode::CreatePatient => values
            .with("name", FieldValue::text("Jo"))
            .with("email", FieldValue::text("jo@x.com"))
            .with("phone", FieldValue::text("0712345678")),
        FormMode::RegisterPatient => values
            .with("name", FieldValue::text("Amani Njeri"))
            .with("email", FieldValue::text("amani@example.com"))
            .with("phone", FieldValue::text("+254712345678"))
            .with("address", FieldValue::text("Karen, Nairobi"))
            .with("emergencyContactName", FieldValue::text("Wanjiru Njeri"))
            .with("emergencyContactNumber", FieldValue::text("+254700000001"))
            .with("primaryPhysician", FieldValue::text("John Green"))
            .with("identificationNumber", FieldValue::text("12345678"))
            .with("treatmentConsent", FieldValue::Bool(true))
            .with("disclosureConsent", FieldValue::Bool(true))
            .with("privacyConsent", FieldValue::Bool(true)),
        FormMode::CreateAppointment | FormMode::ScheduleAppointment => values
            .with("primaryPhysician", FieldValue::text("Leila Cameron"))
            .with("reason", FieldValue::text("Annual checkup")),
        FormMode::CancelAppointment => {
            values.with("cancellationReason", FieldValue::text("Patient unavailable"))
        }
    }
}

/// Opens `mode` and writes `values` into it field by field.
pub fn filled(mode: FormMode, values: &ValueMap) -> FormController {
    let controller = open(mode, &config(), defaults(mode, session_start())).expect("form opens");
    let names: Vec<String> = controller
        .definition()
        .fields()
        .map(|field| field.name.clone())
        .collect();
    for name in names {
        if let Some(value) = values.get(&name) {
            controller
                .set_value(&name, value.clone())
                .expect("known field");
        }
    }
    controller
}
