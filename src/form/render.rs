//! Maps a field descriptor to a concrete input widget.
//!
//! [`render`] is a total function over [`FieldType`]: six fixed widgets plus
//! the custom-skeleton variant, whose closure builds a [`CustomWidget`]. The
//! rendered widget never touches the value map itself; every accepted change
//! goes through the `on_change` callback supplied by the caller.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::errors::ConfigurationError;
use crate::form::field::{FieldDescriptor, FieldType, Icon, SelectOption, DEFAULT_DATE_FORMAT};
use crate::form::value::FieldValue;

pub const DEFAULT_PHONE_REGION: &str = "KE";
pub const TIME_INPUT_LABEL: &str = "Time:";

static CALLING_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("KE", "254"),
        ("UG", "256"),
        ("TZ", "255"),
        ("RW", "250"),
        ("ET", "251"),
        ("NG", "234"),
        ("GH", "233"),
        ("ZA", "27"),
        ("GB", "44"),
        ("IN", "91"),
        ("US", "1"),
        ("CA", "1"),
    ])
});

/// Country calling code for an ISO region, if known.
pub fn calling_code(region: &str) -> Option<&'static str> {
    CALLING_CODES
        .get(region.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Normalizes a phone number to `+<country code><number>`.
///
/// Separators are dropped, a `00` prefix becomes `+`, and a national number
/// (leading trunk `0`) is rewritten with the calling code of `region`. Input
/// that is not phone-shaped is returned trimmed so validation can reject it.
pub fn normalize_phone(raw: &str, region: &str) -> String {
    let trimmed = raw.trim();
    let compact: String = trimmed
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if compact.is_empty() {
        return String::new();
    }
    let (international, digits) = match compact.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => match compact.strip_prefix("00") {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        },
    };
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return trimmed.to_string();
    }
    if international {
        return format!("+{digits}");
    }
    match calling_code(region) {
        Some(code) => {
            let national = digits.strip_prefix('0').unwrap_or(digits);
            format!("+{code}{national}")
        }
        None => format!("+{digits}"),
    }
}

/// Live view of a field handed to custom-skeleton renderers.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding<'a> {
    pub name: &'a str,
    pub label: Option<&'a str>,
    pub value: Option<&'a FieldValue>,
}

/// Widget built by a custom-skeleton renderer.
pub trait CustomWidget {
    /// Text lines describing the widget's current state.
    fn lines(&self) -> Vec<String>;

    /// Turns typed input into a field value.
    fn interpret(&self, raw: &str) -> Result<FieldValue, String>;
}

/// Reasons a widget refuses a change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("this field is read-only")]
    Disabled,
    #[error("expected a {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("`{input}` is not one of the available options{}", suggestion_suffix(.suggestion))]
    UnknownOption {
        input: String,
        suggestion: Option<String>,
    },
    #[error("{0}")]
    Parse(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|value| format!(" (did you mean `{value}`?)"))
        .unwrap_or_default()
}

/// Concrete widget chosen for a field.
pub enum WidgetKind {
    TextInput {
        value: String,
        placeholder: Option<String>,
        icon: Option<Icon>,
        max_length: Option<usize>,
    },
    TextArea {
        value: String,
        placeholder: Option<String>,
        disabled: bool,
        max_length: Option<usize>,
    },
    PhoneInput {
        value: String,
        placeholder: Option<String>,
        default_region: String,
    },
    Checkbox {
        id: String,
        checked: bool,
        label: Option<String>,
    },
    DatePicker {
        selected: DateTime<Utc>,
        format: String,
        show_time_select: bool,
    },
    Select {
        options: Vec<SelectOption>,
        selected: Option<String>,
        placeholder: Option<String>,
    },
    Custom(Box<dyn CustomWidget>),
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::TextInput { .. } => "text-input",
            WidgetKind::TextArea { .. } => "text-area",
            WidgetKind::PhoneInput { .. } => "phone-input",
            WidgetKind::Checkbox { .. } => "checkbox",
            WidgetKind::DatePicker { .. } => "date-picker",
            WidgetKind::Select { .. } => "select",
            WidgetKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type OnChange<'a> = Box<dyn FnMut(FieldValue) + 'a>;

/// A widget bound to one field and to the caller's change callback.
pub struct RenderedWidget<'a> {
    pub name: &'a str,
    /// Label shown above the widget. Checkboxes carry theirs inline instead.
    pub label: Option<&'a str>,
    pub kind: WidgetKind,
    on_change: OnChange<'a>,
}

/// Renders with the default phone region.
pub fn render<'a>(
    descriptor: &'a FieldDescriptor,
    current: Option<&FieldValue>,
    on_change: OnChange<'a>,
) -> RenderedWidget<'a> {
    Renderer::default().render(descriptor, current, on_change)
}

/// Dispatcher settings that are not part of any single descriptor.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub phone_region: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            phone_region: DEFAULT_PHONE_REGION.to_string(),
        }
    }
}

impl Renderer {
    pub fn with_phone_region(region: impl Into<String>) -> Self {
        Self {
            phone_region: region.into(),
        }
    }

    /// Like [`Renderer::with_phone_region`], but refuses a region without a
    /// known calling code.
    pub fn for_region(region: &str) -> Result<Self, ConfigurationError> {
        if calling_code(region).is_none() {
            return Err(ConfigurationError::InvalidConstraint {
                field: "default_phone_region".to_string(),
                reason: format!("no calling code for region `{}`", region.trim()),
            });
        }
        Ok(Self::with_phone_region(region.trim().to_ascii_uppercase()))
    }

    pub fn render<'a>(
        &self,
        descriptor: &'a FieldDescriptor,
        current: Option<&FieldValue>,
        on_change: OnChange<'a>,
    ) -> RenderedWidget<'a> {
        let text = current
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string();
        let label = descriptor.label.as_deref();

        let kind = match &descriptor.field_type {
            FieldType::Text => WidgetKind::TextInput {
                value: text,
                placeholder: descriptor.placeholder.clone(),
                icon: descriptor.icon.clone(),
                max_length: descriptor.max_length,
            },
            FieldType::MultilineText => WidgetKind::TextArea {
                value: text,
                placeholder: descriptor.placeholder.clone(),
                disabled: descriptor.disabled,
                max_length: descriptor.max_length,
            },
            FieldType::Phone => WidgetKind::PhoneInput {
                value: text,
                placeholder: descriptor.placeholder.clone(),
                default_region: self.phone_region.clone(),
            },
            FieldType::Checkbox => WidgetKind::Checkbox {
                id: descriptor.name.clone(),
                checked: current.and_then(FieldValue::as_bool).unwrap_or(false),
                label: descriptor.label.clone(),
            },
            FieldType::Date => WidgetKind::DatePicker {
                selected: current.and_then(FieldValue::as_date).unwrap_or_else(Utc::now),
                format: descriptor.date_format().to_string(),
                show_time_select: descriptor.show_time_select,
            },
            FieldType::Select => WidgetKind::Select {
                options: descriptor.options.clone(),
                selected: current
                    .and_then(FieldValue::as_text)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string),
                placeholder: descriptor.placeholder.clone(),
            },
            FieldType::CustomSkeleton(renderer) => {
                let binding = FieldBinding {
                    name: &descriptor.name,
                    label,
                    value: current,
                };
                WidgetKind::Custom(renderer(&binding))
            }
        };

        let inline_label = matches!(kind, WidgetKind::Checkbox { .. });
        RenderedWidget {
            name: &descriptor.name,
            label: if inline_label { None } else { label },
            kind,
            on_change,
        }
    }
}

impl<'a> RenderedWidget<'a> {
    pub fn is_disabled(&self) -> bool {
        matches!(self.kind, WidgetKind::TextArea { disabled: true, .. })
    }

    /// Emits a typed value, as a graphical widget would on change.
    pub fn emit(&mut self, value: FieldValue) -> Result<(), WidgetError> {
        let accepted = self.accept(value)?;
        self.store(accepted.clone());
        (self.on_change)(accepted);
        Ok(())
    }

    /// Interprets one line of typed input for this widget and emits it.
    pub fn input(&mut self, raw: &str) -> Result<(), WidgetError> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let value = match &self.kind {
            WidgetKind::TextInput { .. } | WidgetKind::TextArea { .. } => FieldValue::text(raw),
            WidgetKind::PhoneInput { .. } => FieldValue::text(raw),
            WidgetKind::Checkbox { .. } => FieldValue::Bool(parse_flag(raw)?),
            WidgetKind::DatePicker {
                selected,
                format,
                show_time_select,
            } => {
                if raw.trim().is_empty() {
                    FieldValue::Date(*selected)
                } else {
                    FieldValue::Date(parse_date(raw, format, *show_time_select)?)
                }
            }
            WidgetKind::Select { options, .. } => {
                FieldValue::text(resolve_option(options, raw)?.value.clone())
            }
            WidgetKind::Custom(widget) => widget.interpret(raw).map_err(WidgetError::Parse)?,
        };
        self.emit(value)
    }

    fn accept(&self, value: FieldValue) -> Result<FieldValue, WidgetError> {
        match (&self.kind, value) {
            (WidgetKind::TextArea { disabled: true, .. }, _) => Err(WidgetError::Disabled),
            (
                WidgetKind::TextInput { max_length, .. } | WidgetKind::TextArea { max_length, .. },
                FieldValue::Text(text),
            ) => match max_length {
                Some(max) if text.chars().count() > *max => Err(WidgetError::TooLong { max: *max }),
                _ => Ok(FieldValue::Text(text)),
            },
            (WidgetKind::PhoneInput { default_region, .. }, FieldValue::Text(text)) => {
                Ok(FieldValue::Text(normalize_phone(&text, default_region)))
            }
            (WidgetKind::Checkbox { .. }, value @ FieldValue::Bool(_)) => Ok(value),
            (WidgetKind::DatePicker { .. }, value @ FieldValue::Date(_)) => Ok(value),
            (WidgetKind::Select { options, .. }, FieldValue::Text(text)) => {
                if options.iter().any(|option| option.value == text) {
                    Ok(FieldValue::Text(text))
                } else {
                    Err(unknown_option(options, &text))
                }
            }
            (WidgetKind::Custom(_), value) => Ok(value),
            (kind, value) => Err(WidgetError::TypeMismatch {
                expected: expected_kind(kind),
                found: value.kind_name(),
            }),
        }
    }

    // Keeps the widget's own display state in step with what it emitted.
    fn store(&mut self, emitted: FieldValue) {
        match (&mut self.kind, emitted) {
            (
                WidgetKind::TextInput { value, .. }
                | WidgetKind::TextArea { value, .. }
                | WidgetKind::PhoneInput { value, .. },
                FieldValue::Text(text),
            ) => *value = text,
            (WidgetKind::Checkbox { checked, .. }, FieldValue::Bool(flag)) => *checked = flag,
            (WidgetKind::DatePicker { selected, .. }, FieldValue::Date(date)) => *selected = date,
            (WidgetKind::Select { selected, .. }, FieldValue::Text(text)) => *selected = Some(text),
            _ => {}
        }
    }

    /// Plain-text rendering of the widget, label line first.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(label) = self.label {
            lines.push(label.to_string());
        }
        match &self.kind {
            WidgetKind::TextInput {
                value,
                placeholder,
                icon,
                ..
            } => {
                let prefix = icon
                    .as_ref()
                    .map(|icon| format!("[{}] ", icon.alt))
                    .unwrap_or_default();
                lines.push(format!("  {prefix}{}", shown(value, placeholder)));
            }
            WidgetKind::TextArea {
                value,
                placeholder,
                disabled,
                ..
            } => {
                let body = shown(value, placeholder);
                let mut rows: Vec<String> = body.lines().map(|row| format!("  | {row}")).collect();
                if rows.is_empty() {
                    rows.push("  | ".to_string());
                }
                if *disabled {
                    rows.push("  (read-only)".to_string());
                }
                lines.extend(rows);
            }
            WidgetKind::PhoneInput {
                value,
                placeholder,
                default_region,
            } => {
                let code = calling_code(default_region)
                    .map(|code| format!(" +{code}"))
                    .unwrap_or_default();
                lines.push(format!(
                    "  [{}{}] {}",
                    default_region.to_ascii_uppercase(),
                    code,
                    shown(value, placeholder)
                ));
            }
            WidgetKind::Checkbox { checked, label, .. } => {
                let mark = if *checked { "x" } else { " " };
                lines.push(format!("  [{mark}] {}", label.as_deref().unwrap_or("")));
            }
            WidgetKind::DatePicker {
                selected,
                format,
                show_time_select,
            } => {
                let mut line = format!("  [calendar] {}", display_date(selected, format));
                if *show_time_select {
                    line.push_str(&format!("  {TIME_INPUT_LABEL} {}", selected.format("%H:%M")));
                }
                lines.push(line);
            }
            WidgetKind::Select {
                options,
                selected,
                placeholder,
            } => {
                let current = selected
                    .as_deref()
                    .and_then(|value| options.iter().find(|option| option.value == value))
                    .map(|option| option.label.clone())
                    .or_else(|| placeholder.clone())
                    .unwrap_or_default();
                lines.push(format!("  v {current}"));
                for (index, option) in options.iter().enumerate() {
                    let marker = if selected.as_deref() == Some(option.value.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    lines.push(format!("   {marker}{}. {}", index + 1, option.label));
                }
            }
            WidgetKind::Custom(widget) => {
                lines.extend(widget.lines().into_iter().map(|line| format!("  {line}")))
            }
        }
        lines
    }
}

/// Formats `date` with `format`, falling back to the default pattern when
/// chrono cannot render it.
fn display_date(date: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(DEFAULT_DATE_FORMAT));
    }
    out
}

impl fmt::Debug for RenderedWidget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedWidget")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish()
    }
}

fn shown<'v>(value: &'v str, placeholder: &'v Option<String>) -> &'v str {
    if value.is_empty() {
        placeholder.as_deref().unwrap_or("")
    } else {
        value
    }
}

fn expected_kind(kind: &WidgetKind) -> &'static str {
    match kind {
        WidgetKind::Checkbox { .. } => "boolean",
        WidgetKind::DatePicker { .. } => "date",
        WidgetKind::Custom(_) => "custom",
        _ => "text",
    }
}

fn parse_flag(raw: &str) -> Result<bool, WidgetError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "x" => Ok(true),
        "n" | "no" | "false" | "0" | "" => Ok(false),
        _ => Err(WidgetError::Parse(
            "Enter yes/no, true/false, or 1/0 to indicate boolean values".into(),
        )),
    }
}

/// Parses a date using the widget's display format, then ISO forms.
pub fn parse_date(raw: &str, format: &str, with_time: bool) -> Result<DateTime<Utc>, WidgetError> {
    let raw = raw.trim();
    let attempts: [&str; 3] = [format, "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];
    for candidate in attempts {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, candidate) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    for candidate in [format, "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, candidate) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }
    let expected = if with_time {
        "a date and time"
    } else {
        "a date"
    };
    Err(WidgetError::Parse(format!(
        "Enter {expected} in the format {format} (or YYYY-MM-DD)"
    )))
}

fn resolve_option<'o>(options: &'o [SelectOption], raw: &str) -> Result<&'o SelectOption, WidgetError> {
    let key = raw.trim();
    if let Ok(index) = key.parse::<usize>() {
        if let Some(option) = index.checked_sub(1).and_then(|idx| options.get(idx)) {
            return Ok(option);
        }
    }
    options
        .iter()
        .find(|option| option.value == key)
        .or_else(|| {
            options
                .iter()
                .find(|option| option.label.eq_ignore_ascii_case(key))
        })
        .ok_or_else(|| unknown_option(options, key))
}

fn unknown_option(options: &[SelectOption], input: &str) -> WidgetError {
    let needle = input.to_ascii_lowercase();
    let suggestion = options
        .iter()
        .map(|option| {
            let score = strsim::jaro_winkler(&needle, &option.label.to_ascii_lowercase());
            (score, option)
        })
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, option)| option.label.clone());
    WidgetError::UnknownOption {
        input: input.to_string(),
        suggestion,
    }
}
