//! Declarative description of form fields.
//!
//! A [`FormDefinition`] is built once per form mode and never changes while a
//! session is running. It is checked against the default value table and the
//! validation schema before a controller accepts it, so a misspelled field name
//! fails at definition time instead of at render time.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::form::render::{CustomWidget, FieldBinding};
use crate::form::schema::Schema;
use crate::form::value::ValueMap;

/// Closure used by custom-skeleton fields to build their own widget.
pub type SkeletonRenderer =
    Arc<dyn Fn(&FieldBinding<'_>) -> Box<dyn CustomWidget> + Send + Sync>;

/// The closed set of field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldTag {
    Text,
    MultilineText,
    Phone,
    Checkbox,
    Date,
    Select,
    CustomSkeleton,
}

impl FieldTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldTag::Text => "text",
            FieldTag::MultilineText => "multiline-text",
            FieldTag::Phone => "phone",
            FieldTag::Checkbox => "checkbox",
            FieldTag::Date => "date",
            FieldTag::Select => "select",
            FieldTag::CustomSkeleton => "custom-skeleton",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "input" => Some(FieldTag::Text),
            "multiline-text" | "textarea" => Some(FieldTag::MultilineText),
            "phone" | "phone_input" => Some(FieldTag::Phone),
            "checkbox" => Some(FieldTag::Checkbox),
            "date" | "datepicker" => Some(FieldTag::Date),
            "select" => Some(FieldTag::Select),
            "custom-skeleton" | "skeleton" => Some(FieldTag::CustomSkeleton),
            _ => None,
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field type: six fixed widgets plus an escape hatch carrying its own renderer.
#[derive(Clone)]
pub enum FieldType {
    Text,
    MultilineText,
    Phone,
    Checkbox,
    Date,
    Select,
    CustomSkeleton(SkeletonRenderer),
}

impl FieldType {
    pub fn tag(&self) -> FieldTag {
        match self {
            FieldType::Text => FieldTag::Text,
            FieldType::MultilineText => FieldTag::MultilineText,
            FieldType::Phone => FieldTag::Phone,
            FieldType::Checkbox => FieldTag::Checkbox,
            FieldType::Date => FieldTag::Date,
            FieldType::Select => FieldTag::Select,
            FieldType::CustomSkeleton(_) => FieldTag::CustomSkeleton,
        }
    }

    /// Resolves a tag name coming from outside the crate.
    ///
    /// Unknown names, and `custom-skeleton` (which needs a renderer that a
    /// name cannot carry), resolve to a plain text input.
    pub fn from_tag_name(raw: &str) -> Self {
        match FieldTag::parse(raw) {
            Some(FieldTag::Text) => FieldType::Text,
            Some(FieldTag::MultilineText) => FieldType::MultilineText,
            Some(FieldTag::Phone) => FieldType::Phone,
            Some(FieldTag::Checkbox) => FieldType::Checkbox,
            Some(FieldTag::Date) => FieldType::Date,
            Some(FieldTag::Select) => FieldType::Select,
            Some(FieldTag::CustomSkeleton) | None => {
                tracing::warn!(tag = raw, "unsupported field tag, rendering as text input");
                FieldType::Text
            }
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::CustomSkeleton(_) => f.write_str("CustomSkeleton(..)"),
            other => write!(f, "{:?}", other.tag()),
        }
    }
}

/// Decorative icon shown next to single-line inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub src: String,
    pub alt: String,
}

/// One entry of a select field. The option list is supplied by the form
/// author; the dispatcher only displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Declarative description of a single form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub icon: Option<Icon>,
    pub disabled: bool,
    pub date_format: Option<String>,
    pub show_time_select: bool,
    pub max_length: Option<usize>,
    pub options: Vec<SelectOption>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: None,
            placeholder: None,
            icon: None,
            disabled: false,
            date_format: None,
            show_time_select: false,
            max_length: None,
            options: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn multiline(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::MultilineText)
    }

    pub fn phone(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Phone)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Checkbox)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn select(name: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let mut descriptor = Self::new(name, FieldType::Select);
        descriptor.options = options;
        descriptor
    }

    pub fn skeleton<F>(name: impl Into<String>, renderer: F) -> Self
    where
        F: Fn(&FieldBinding<'_>) -> Box<dyn CustomWidget> + Send + Sync + 'static,
    {
        Self::new(name, FieldType::CustomSkeleton(Arc::new(renderer)))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_icon(mut self, src: impl Into<String>, alt: impl Into<String>) -> Self {
        self.icon = Some(Icon {
            src: src.into(),
            alt: alt.into(),
        });
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_time_select(mut self) -> Self {
        self.show_time_select = true;
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn tag(&self) -> FieldTag {
        self.field_type.tag()
    }

    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    /// Label for summaries and error listings; falls back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Shape check performed when the owning form is defined.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        match self.field_type {
            FieldType::Select if self.options.is_empty() => {
                Err(self.invalid("select field needs at least one option"))
            }
            FieldType::Date if !is_valid_date_format(self.date_format()) => {
                Err(self.invalid("date format is empty or not a valid strftime pattern"))
            }
            _ if self.max_length == Some(0) => Err(self.invalid("max length must be positive")),
            _ => Ok(()),
        }
    }

    fn invalid(&self, reason: &str) -> ConfigurationError {
        ConfigurationError::InvalidConstraint {
            field: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

fn is_valid_date_format(format: &str) -> bool {
    !format.trim().is_empty()
        && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Named group of fields shown under a sub-header.
#[derive(Debug, Clone)]
pub struct FormSection {
    pub title: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

/// A complete form: chrome, sections and the field order.
#[derive(Debug, Clone)]
pub struct FormDefinition {
    pub name: String,
    pub header: String,
    pub subtitle: Option<String>,
    pub sections: Vec<FormSection>,
    pub submit_label: String,
    pub destructive: bool,
}

impl FormDefinition {
    pub fn new(name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
            subtitle: None,
            sections: Vec::new(),
            submit_label: "Submit".into(),
            destructive: false,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    /// Appends fields that are not under any sub-header.
    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.sections.push(FormSection {
            title: None,
            fields,
        });
        self
    }

    pub fn with_section(mut self, title: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.sections.push(FormSection {
            title: Some(title.into()),
            fields,
        });
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.name == name)
    }

    /// Verifies every descriptor is well formed and bound to both a default
    /// value and a schema rule.
    pub fn check(&self, defaults: &ValueMap, schema: &Schema) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            field.check()?;
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigurationError::DuplicateField(field.name.clone()));
            }
            if !defaults.contains(&field.name) {
                return Err(ConfigurationError::MissingDefault(field.name.clone()));
            }
            if schema.rule(&field.name).is_none() {
                return Err(ConfigurationError::MissingRule(field.name.clone()));
            }
        }
        for name in schema.field_names() {
            if !seen.contains(name) {
                return Err(ConfigurationError::UnknownField(name.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::Rule;
    use crate::form::value::FieldValue;

    fn schema() -> Schema {
        Schema::new("test")
            .field("name", Rule::required_text(2, "Name is required"))
            .field("consent", Rule::must_be_true("Consent is required"))
    }

    fn defaults() -> ValueMap {
        ValueMap::new()
            .with("name", FieldValue::text(""))
            .with("consent", FieldValue::Bool(false))
    }

    #[test]
    fn tag_names_accept_both_vocabularies() {
        assert_eq!(FieldTag::parse("textarea"), Some(FieldTag::MultilineText));
        assert_eq!(FieldTag::parse("multiline-text"), Some(FieldTag::MultilineText));
        assert_eq!(FieldTag::parse("datepicker"), Some(FieldTag::Date));
        assert_eq!(FieldTag::parse("slider"), None);
    }

    #[test]
    fn unknown_tag_name_falls_back_to_text() {
        assert_eq!(FieldType::from_tag_name("slider").tag(), FieldTag::Text);
        assert_eq!(FieldType::from_tag_name("skeleton").tag(), FieldTag::Text);
        assert_eq!(FieldType::from_tag_name("phone_input").tag(), FieldTag::Phone);
    }

    #[test]
    fn definition_check_accepts_bound_fields() {
        let form = FormDefinition::new("test", "Test").with_fields(vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::checkbox("consent"),
        ]);
        assert_eq!(form.check(&defaults(), &schema()), Ok(()));
    }

    #[test]
    fn definition_check_rejects_empty_name() {
        let form = FormDefinition::new("test", "Test").with_fields(vec![FieldDescriptor::text(" ")]);
        assert_eq!(
            form.check(&defaults(), &schema()),
            Err(ConfigurationError::EmptyName)
        );
    }

    #[test]
    fn definition_check_reports_unbound_names() {
        let form = FormDefinition::new("test", "Test").with_fields(vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::checkbox("consent"),
            FieldDescriptor::text("nickname"),
        ]);
        assert_eq!(
            form.check(&defaults(), &schema()),
            Err(ConfigurationError::MissingDefault("nickname".into()))
        );

        let form = FormDefinition::new("test", "Test").with_fields(vec![FieldDescriptor::text("name")]);
        assert_eq!(
            form.check(&defaults(), &schema()),
            Err(ConfigurationError::UnknownField("consent".into()))
        );
    }

    #[test]
    fn definition_check_rejects_duplicates_and_bad_constraints() {
        let form = FormDefinition::new("test", "Test").with_fields(vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::text("name"),
        ]);
        assert_eq!(
            form.check(&defaults(), &schema()),
            Err(ConfigurationError::DuplicateField("name".into()))
        );

        let date = FieldDescriptor::date("when").with_date_format("%Q");
        assert!(matches!(
            date.check(),
            Err(ConfigurationError::InvalidConstraint { .. })
        ));

        let select = FieldDescriptor::select("name", Vec::new());
        assert!(matches!(
            select.check(),
            Err(ConfigurationError::InvalidConstraint { .. })
        ));
    }
}
