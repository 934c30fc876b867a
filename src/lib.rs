#![doc(test(attr(deny(warnings))))]

//! Intake Forms is a declarative form engine for patient intake: field
//! descriptors, mode-specific validation schemas, a widget dispatcher, a
//! per-session controller and the submission policies that hand validated
//! values to the patient services.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod intake;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(build = utils::build_info().hash, "Intake Forms tracing initialized.");
    });
}
