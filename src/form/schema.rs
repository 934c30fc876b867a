use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::form::value::{FieldValue, ValueMap};

type CustomCheck = dyn Fn(Option<&FieldValue>) -> Result<(), String> + Send + Sync;

/// Composable validation rule applied to a single field value.
#[derive(Clone)]
pub enum Rule {
    /// Non-blank text, trimmed length within `min..=max`.
    Text {
        min: usize,
        max: Option<usize>,
        message: String,
    },
    Email {
        message: String,
    },
    /// Telephone syntax with at least `min_digits` digits.
    Phone {
        min_digits: usize,
        message: String,
    },
    OneOf {
        options: Vec<String>,
        message: String,
    },
    Date {
        message: String,
    },
    MustBeTrue {
        message: String,
    },
    /// Zero or more attached files.
    Files,
    /// Blank or missing passes; anything else must satisfy the inner rule.
    Optional(Box<Rule>),
    /// Every rule must pass; the first failure wins.
    All(Vec<Rule>),
    Custom(Arc<CustomCheck>),
}

impl Rule {
    pub fn required_text(min: usize, message: impl Into<String>) -> Self {
        Rule::Text {
            min: min.max(1),
            max: None,
            message: message.into(),
        }
    }

    pub fn bounded_text(min: usize, max: usize, message: impl Into<String>) -> Self {
        Rule::Text {
            min: min.max(1),
            max: Some(max),
            message: message.into(),
        }
    }

    pub fn optional_text() -> Self {
        Rule::Optional(Box::new(Rule::Text {
            min: 1,
            max: None,
            message: String::new(),
        }))
    }

    pub fn email(message: impl Into<String>) -> Self {
        Rule::Email {
            message: message.into(),
        }
    }

    pub fn phone(min_digits: usize, message: impl Into<String>) -> Self {
        Rule::Phone {
            min_digits,
            message: message.into(),
        }
    }

    pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn date(message: impl Into<String>) -> Self {
        Rule::Date {
            message: message.into(),
        }
    }

    pub fn must_be_true(message: impl Into<String>) -> Self {
        Rule::MustBeTrue {
            message: message.into(),
        }
    }

    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> Result<(), String> + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(check))
    }

    pub fn optional(self) -> Self {
        Rule::Optional(Box::new(self))
    }

    /// Whether a blank value passes this rule.
    pub fn is_optional(&self) -> bool {
        match self {
            Rule::Optional(_) | Rule::Files => true,
            Rule::All(rules) => rules.iter().all(Rule::is_optional),
            _ => false,
        }
    }

    pub fn check(&self, value: Option<&FieldValue>) -> Result<(), String> {
        match self {
            Rule::Text { min, max, message } => {
                let text = trimmed_text(value);
                let len = text.chars().count();
                if len < *min {
                    return Err(message.clone());
                }
                match max {
                    Some(max) if len > *max => {
                        Err(format!("Must be at most {max} characters"))
                    }
                    _ => Ok(()),
                }
            }
            Rule::Email { message } => {
                if is_email(trimmed_text(value)) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }
            Rule::Phone {
                min_digits,
                message,
            } => {
                if is_phone(trimmed_text(value), *min_digits) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }
            Rule::OneOf { options, message } => {
                let text = trimmed_text(value);
                if options.iter().any(|option| option == text) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }
            Rule::Date { message } => match value {
                Some(FieldValue::Date(_)) => Ok(()),
                _ => Err(message.clone()),
            },
            Rule::MustBeTrue { message } => match value {
                Some(FieldValue::Bool(true)) => Ok(()),
                _ => Err(message.clone()),
            },
            Rule::Files => match value {
                None | Some(FieldValue::Files(_)) => Ok(()),
                Some(other) => Err(format!("Expected files, found {}", other.kind_name())),
            },
            Rule::Optional(inner) => {
                if is_blank(value) {
                    Ok(())
                } else {
                    inner.check(value)
                }
            }
            Rule::All(rules) => rules.iter().try_for_each(|rule| rule.check(value)),
            Rule::Custom(check) => check(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Text { min, max, .. } => write!(f, "Text({min}..{max:?})"),
            Rule::Email { .. } => f.write_str("Email"),
            Rule::Phone { min_digits, .. } => write!(f, "Phone(min {min_digits})"),
            Rule::OneOf { options, .. } => write!(f, "OneOf({options:?})"),
            Rule::Date { .. } => f.write_str("Date"),
            Rule::MustBeTrue { .. } => f.write_str("MustBeTrue"),
            Rule::Files => f.write_str("Files"),
            Rule::Optional(inner) => write!(f, "Optional({inner:?})"),
            Rule::All(rules) => write!(f, "All({rules:?})"),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn trimmed_text(value: Option<&FieldValue>) -> &str {
    value.and_then(FieldValue::as_text).unwrap_or("").trim()
}

fn is_blank(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(FieldValue::Text(text)) => text.trim().is_empty(),
        Some(FieldValue::Files(files)) => files.is_empty(),
        Some(FieldValue::Bool(_) | FieldValue::Date(_)) => false,
    }
}

pub(crate) fn is_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub(crate) fn is_phone(candidate: &str, min_digits: usize) -> bool {
    let body = candidate.strip_prefix('+').unwrap_or(candidate);
    if body.is_empty() {
        return false;
    }
    let allowed = body
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')' | '.'));
    let digits = body.chars().filter(char::is_ascii_digit).count();
    allowed && digits >= min_digits && digits <= 15
}

/// Field name to error message. A field that is absent is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(name.into(), message.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Outcome of one validation pass over a whole value map.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(ValueMap),
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Invalid(errors) => Some(errors),
            ValidationResult::Valid(_) => None,
        }
    }
}

/// Immutable mapping from field name to rule.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    rules: Vec<(String, Rule)>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        self.rules.retain(|(existing, _)| *existing != name);
        self.rules.push((name, rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, rule)| rule)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Names whose rule rejects a blank value.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|(_, rule)| !rule.is_optional())
            .map(|(name, _)| name.as_str())
    }

    /// Checks one field against the full value map.
    pub fn validate_field(&self, name: &str, values: &ValueMap) -> Option<String> {
        self.rule(name)
            .and_then(|rule| rule.check(values.get(name)).err())
    }

    /// Runs every rule and reports all failures at once.
    pub fn validate(&self, values: &ValueMap) -> ValidationResult {
        let mut errors = FieldErrors::new();
        for (name, rule) in &self.rules {
            if let Err(message) = rule.check(values.get(name)) {
                errors.insert(name.clone(), message);
            }
        }
        if errors.is_empty() {
            ValidationResult::Valid(values.clone())
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn email_shapes() {
        assert!(is_email("jo@x.com"));
        assert!(is_email("first.last@clinic.co.ke"));
        assert!(!is_email("jo@x"));
        assert!(!is_email("@x.com"));
        assert!(!is_email("jo@@x.com"));
        assert!(!is_email("jo @x.com"));
        assert!(!is_email("jo@x..com"));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_phone("0712345678", 10));
        assert!(is_phone("+254712345678", 10));
        assert!(is_phone("+1 (555) 123-4567", 10));
        assert!(!is_phone("071234567", 10));
        assert!(!is_phone("07123abc78", 10));
        assert!(!is_phone("+", 10));
        assert!(!is_phone("1234567890123456", 10));
    }

    #[test]
    fn text_rule_trims_and_bounds() {
        let rule = Rule::bounded_text(2, 5, "too short");
        assert_eq!(rule.check(Some(&FieldValue::text(" J "))), Err("too short".into()));
        assert_eq!(rule.check(None), Err("too short".into()));
        assert_eq!(rule.check(Some(&FieldValue::text("Jo"))), Ok(()));
        assert_eq!(
            rule.check(Some(&FieldValue::text("Joanna"))),
            Err("Must be at most 5 characters".into())
        );
    }

    #[test]
    fn optional_wraps_inner_rule() {
        let rule = Rule::phone(10, "Invalid phone number").optional();
        assert_eq!(rule.check(Some(&FieldValue::text(""))), Ok(()));
        assert_eq!(rule.check(None), Ok(()));
        assert_eq!(
            rule.check(Some(&FieldValue::text("123"))),
            Err("Invalid phone number".into())
        );
        assert!(rule.is_optional());
    }

    #[test]
    fn must_be_true_rejects_false_and_missing() {
        let rule = Rule::must_be_true("consent");
        assert!(rule.check(Some(&FieldValue::Bool(true))).is_ok());
        assert!(rule.check(Some(&FieldValue::Bool(false))).is_err());
        assert!(rule.check(None).is_err());
    }

    #[test]
    fn all_reports_first_failure() {
        let rule = Rule::All(vec![
            Rule::required_text(1, "required"),
            Rule::custom(|value| match value.and_then(FieldValue::as_text) {
                Some(text) if text.starts_with('A') => Ok(()),
                _ => Err("must start with A".into()),
            }),
        ]);
        assert_eq!(rule.check(None), Err("required".into()));
        assert_eq!(
            rule.check(Some(&FieldValue::text("Bob"))),
            Err("must start with A".into())
        );
        assert_eq!(rule.check(Some(&FieldValue::text("Ann"))), Ok(()));
    }

    #[test]
    fn validate_collects_every_failure() {
        let schema = Schema::new("sample")
            .field("name", Rule::required_text(2, "name"))
            .field("email", Rule::email("email"))
            .field("when", Rule::date("when"))
            .field("note", Rule::optional_text());

        let values = ValueMap::new()
            .with("name", FieldValue::text("J"))
            .with("email", FieldValue::text("nope"));
        let result = schema.validate(&values);
        let errors = result.errors().expect("invalid");
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "name", "when"]);

        let values = ValueMap::new()
            .with("name", FieldValue::text("Jo"))
            .with("email", FieldValue::text("jo@x.com"))
            .with("when", FieldValue::Date(Utc::now()));
        assert!(schema.validate(&values).is_valid());
        assert_eq!(
            schema.required_fields().collect::<Vec<_>>(),
            vec!["name", "email", "when"]
        );
    }
}
