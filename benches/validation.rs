use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use intake_forms::form::FieldValue;
use intake_forms::intake::{defaults, resolve, FormMode};

fn registration_values() -> intake_forms::form::ValueMap {
    let start = Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap();
    defaults(FormMode::RegisterPatient, start)
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
        .with("privacyConsent", FieldValue::Bool(true))
}

fn bench_validation(c: &mut Criterion) {
    let schema = resolve(FormMode::RegisterPatient);
    let valid = registration_values();
    let blank = defaults(FormMode::RegisterPatient, Utc::now());

    c.bench_function("register_validate_valid", |b| {
        b.iter(|| black_box(schema.validate(black_box(&valid))))
    });

    c.bench_function("register_validate_blank", |b| {
        b.iter(|| black_box(schema.validate(black_box(&blank))))
    });

    c.bench_function("resolve_all_modes", |b| {
        b.iter(|| {
            for mode in FormMode::ALL {
                black_box(resolve(black_box(mode)));
            }
        })
    });
}

criterion_group!(benches, bench_validation);
criterion_main!(benches);
