//! Per-session form state: values, errors and the submit lifecycle.
//!
//! A controller owns one copy of the default table and one value map. Field
//! widgets write through the controller's change callback, validation always
//! reads the latest value map, and the busy flag is the only guard between two
//! submit attempts.
//!
//! Submission is split in two so a caller can await the external service in
//! between: [`FormController::begin_submit`] validates and moves to
//! `Submitting`; [`FormController::complete_submit`] or
//! [`FormController::fail_submit`] ends the attempt. [`FormController::submit`]
//! runs both halves around a [`FormFlow`].

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::{ConfigurationError, SubmissionError};
use crate::form::field::{FieldDescriptor, FormDefinition};
use crate::form::render::{RenderedWidget, Renderer};
use crate::form::schema::{FieldErrors, Schema, ValidationResult};
use crate::form::value::{FieldValue, ValueMap};

/// Message shown when a submit fails for reasons unrelated to any field.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while submitting the form. Please try again.";

/// Lifecycle of one form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    SubmitSucceeded,
    SubmitFailed,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormStatus::Editing => "editing",
            FormStatus::Submitting => "submitting",
            FormStatus::SubmitSucceeded => "submitted",
            FormStatus::SubmitFailed => "failed",
        };
        f.write_str(label)
    }
}

/// Why a submit request did not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    /// A submit is already in flight.
    Busy,
    /// Validation failed; the errors are also stored on the controller.
    Invalid(FieldErrors),
}

/// Final report of [`FormController::submit`].
#[derive(Debug)]
pub enum SubmitReport<T> {
    Succeeded(T),
    Invalid(FieldErrors),
    Failed(SubmissionError),
    Busy,
}

impl<T> SubmitReport<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitReport::Succeeded(_))
    }
}

/// What happens to validated values once a submit starts.
pub trait FormFlow {
    type Output;

    /// Hands validated values to the external service.
    fn commit(&mut self, values: &ValueMap) -> Result<Self::Output, SubmissionError>;

    /// Whether the controller returns to its defaults after success.
    fn reset_on_success(&self) -> bool {
        true
    }

    /// Runs after the controller has recorded success (and reset, if asked).
    fn after_success(&mut self, _output: &Self::Output) {}
}

/// Holds the state of a single form session.
pub struct FormController {
    definition: FormDefinition,
    schema: Schema,
    renderer: Renderer,
    defaults: ValueMap,
    values: RefCell<ValueMap>,
    touched: RefCell<BTreeSet<String>>,
    errors: FieldErrors,
    status: FormStatus,
    last_failure: Option<String>,
}

impl FormController {
    /// Creates a session after checking the definition against its defaults
    /// and schema.
    pub fn new(
        definition: FormDefinition,
        schema: Schema,
        defaults: ValueMap,
    ) -> Result<Self, ConfigurationError> {
        definition.check(&defaults, &schema)?;
        tracing::debug!(form = %definition.name, schema = schema.name(), "form session created");
        Ok(Self {
            definition,
            schema,
            renderer: Renderer::default(),
            values: RefCell::new(defaults.clone()),
            defaults,
            touched: RefCell::new(BTreeSet::new()),
            errors: FieldErrors::new(),
            status: FormStatus::Editing,
            last_failure: None,
        })
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// True only while a submit is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn defaults(&self) -> &ValueMap {
        &self.defaults
    }

    pub fn values(&self) -> ValueMap {
        self.values.borrow().clone()
    }

    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.values.borrow().get(name).cloned()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    /// Generic message left by the last failed submit, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.borrow().contains(name)
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.values.borrow().get(name) != self.defaults.get(name)
    }

    pub fn has_changes(&self) -> bool {
        *self.values.borrow() != self.defaults
    }

    fn descriptor(&self, name: &str) -> Result<&FieldDescriptor, ConfigurationError> {
        self.definition
            .field(name)
            .ok_or_else(|| ConfigurationError::UnknownField(name.to_string()))
    }

    /// Renders the widget for `name`, bound to this controller's values.
    pub fn render(&self, name: &str) -> Result<RenderedWidget<'_>, ConfigurationError> {
        let descriptor = self.descriptor(name)?;
        let current = self.value(name);
        let field_name = descriptor.name.as_str();
        Ok(self.renderer.render(
            descriptor,
            current.as_ref(),
            Box::new(move |value| self.record(field_name, value)),
        ))
    }

    /// Writes a value directly, bypassing any widget.
    pub fn set_value(&self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        let descriptor = self.descriptor(name)?;
        self.record(&descriptor.name, value);
        Ok(())
    }

    fn record(&self, name: &str, value: FieldValue) {
        tracing::debug!(field = name, "field updated");
        self.values.borrow_mut().set(name, value);
        self.touched.borrow_mut().insert(name.to_string());
    }

    /// Marks a field as visited and refreshes its error entry only.
    pub fn blur(&mut self, name: &str) -> Option<&str> {
        self.touched.borrow_mut().insert(name.to_string());
        let message = {
            let values = self.values.borrow();
            self.schema.validate_field(name, &values)
        };
        match message {
            Some(message) => self.errors.insert(name, message),
            None => {
                self.errors.remove(name);
            }
        }
        self.errors.get(name)
    }

    /// Validates the whole value map and stores the resulting errors.
    pub fn validate(&mut self) -> ValidationResult {
        let result = {
            let values = self.values.borrow();
            self.schema.validate(&values)
        };
        match &result {
            ValidationResult::Valid(_) => self.errors.clear(),
            ValidationResult::Invalid(errors) => self.errors = errors.clone(),
        }
        result
    }

    /// Validates and, if valid, moves to `Submitting`.
    ///
    /// Returns the values to submit. While a submit is in flight every further
    /// request is refused with [`SubmitRejected::Busy`].
    pub fn begin_submit(&mut self) -> Result<ValueMap, SubmitRejected> {
        if self.status == FormStatus::Submitting {
            tracing::debug!(form = %self.definition.name, "submit ignored while busy");
            return Err(SubmitRejected::Busy);
        }
        self.status = FormStatus::Editing;
        match self.validate() {
            ValidationResult::Invalid(errors) => {
                tracing::warn!(
                    form = %self.definition.name,
                    failing = errors.len(),
                    "submit blocked by validation"
                );
                Err(SubmitRejected::Invalid(errors))
            }
            ValidationResult::Valid(values) => {
                tracing::info!(form = %self.definition.name, "submitting form");
                self.status = FormStatus::Submitting;
                self.last_failure = None;
                Ok(values)
            }
        }
    }

    /// Records a successful submit. Returns false when no submit was in flight.
    pub fn complete_submit(&mut self, reset: bool) -> bool {
        if self.status != FormStatus::Submitting {
            tracing::warn!(status = %self.status, "completion without a submit in flight");
            return false;
        }
        tracing::info!(form = %self.definition.name, "form submitted");
        if reset {
            self.restore_defaults();
        }
        self.status = FormStatus::SubmitSucceeded;
        true
    }

    /// Records a failed submit and returns to `Editing` with input intact.
    ///
    /// Returns the transient state that was passed through.
    pub fn fail_submit(&mut self, error: &SubmissionError) -> FormStatus {
        if self.status != FormStatus::Submitting {
            tracing::warn!(status = %self.status, "failure without a submit in flight");
            return self.status;
        }
        tracing::error!(form = %self.definition.name, error = %error, "form submission failed");
        self.status = FormStatus::SubmitFailed;
        self.last_failure = Some(GENERIC_FAILURE_MESSAGE.to_string());
        let passed = self.status;
        self.status = FormStatus::Editing;
        passed
    }

    /// Runs a full submit through `flow`.
    pub fn submit<F: FormFlow>(&mut self, flow: &mut F) -> SubmitReport<F::Output> {
        let values = match self.begin_submit() {
            Ok(values) => values,
            Err(SubmitRejected::Busy) => return SubmitReport::Busy,
            Err(SubmitRejected::Invalid(errors)) => return SubmitReport::Invalid(errors),
        };
        match flow.commit(&values) {
            Ok(output) => {
                self.complete_submit(flow.reset_on_success());
                flow.after_success(&output);
                SubmitReport::Succeeded(output)
            }
            Err(error) => {
                self.fail_submit(&error);
                SubmitReport::Failed(error)
            }
        }
    }

    /// Restores the defaults captured at construction and clears all
    /// per-session state. Refused while a submit is in flight.
    pub fn reset(&mut self) -> bool {
        if self.status == FormStatus::Submitting {
            tracing::warn!(form = %self.definition.name, "reset refused while submitting");
            return false;
        }
        self.restore_defaults();
        self.status = FormStatus::Editing;
        true
    }

    fn restore_defaults(&mut self) {
        *self.values.get_mut() = self.defaults.clone();
        self.touched.get_mut().clear();
        self.errors.clear();
        self.last_failure = None;
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.definition.name)
            .field("status", &self.status)
            .field("errors", &self.errors)
            .finish()
    }
}
