//! Generic declarative form engine.
//!
//! Descriptors say what a field is, schemas say what a valid value is, the
//! render dispatcher turns a descriptor into a widget, and the controller ties
//! the three together for one session.

pub mod controller;
pub mod field;
pub mod render;
pub mod schema;
pub mod skeleton;
pub mod value;

pub use controller::{
    FormController, FormFlow, FormStatus, SubmitRejected, SubmitReport, GENERIC_FAILURE_MESSAGE,
};
pub use field::{
    FieldDescriptor, FieldTag, FieldType, FormDefinition, FormSection, Icon, SelectOption,
};
pub use render::{
    normalize_phone, render, CustomWidget, FieldBinding, OnChange, RenderedWidget, Renderer,
    WidgetError, WidgetKind,
};
pub use schema::{FieldErrors, Rule, Schema, ValidationResult};
pub use skeleton::{FileUploader, RadioGroup};
pub use value::{FieldValue, FileAttachment, ValueMap};
