//! Field schemas for records.
//!
//! Each collection describes its fields with a static table of [`FieldSpec`]s.
//! The interactive layer uses that table to prompt, parse and validate input
//! without knowing anything about the concrete record type, and the record
//! type converts between itself and a [`FieldValues`] bag via [`Form`].

use crate::error::{LogbookError, Result};
use crate::model::{Money, Record};
use chrono::{Local, NaiveDate};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Two-place decimal, see [`Money`].
    Decimal,
    /// Calendar date, `YYYY-MM-DD` or `today`.
    Date,
    Bool,
    /// One of a fixed set of tags. Input may be the tag or its 1-based number.
    Choice(&'static [&'static str]),
    /// Comma separated list of strings.
    List,
}

/// Specification for a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Name used as the key in [`FieldValues`]
    pub name: &'static str,

    /// Prompt label shown to the user
    pub label: &'static str,

    pub kind: FieldKind,

    /// Required fields re-prompt on blank input
    pub required: bool,

    /// Part of the record's identity
    pub identity: bool,

    /// Assigned by the store (e.g. sequential ids); never prompted for on add
    pub generated: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            identity: false,
            generated: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn identity(mut self) -> Self {
        self.identity = true;
        self.required = true;
        self
    }

    pub const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Parse raw user input for this field.
    ///
    /// Blank input is not handled here; callers decide whether blank means
    /// "keep", "none" or "required".
    pub fn parse(&self, raw: &str) -> Result<FieldValue> {
        let raw = raw.trim();
        let invalid = |reason: String| LogbookError::validation(self.label, reason);

        match self.kind {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| invalid(format!("'{}' is not a whole number", raw))),
            FieldKind::Decimal => raw.parse::<Money>().map(FieldValue::Decimal).map_err(invalid),
            FieldKind::Date => parse_date(raw).map(FieldValue::Date).map_err(invalid),
            FieldKind::Bool => parse_bool(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| invalid(format!("'{}' is not yes or no", raw))),
            FieldKind::Choice(choices) => parse_choice(raw, choices)
                .map(|c| FieldValue::Choice(c.to_string()))
                .ok_or_else(|| {
                    invalid(format!(
                        "'{}' is not one of: {}",
                        raw,
                        choices.join(", ")
                    ))
                }),
            FieldKind::List => Ok(FieldValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
        }
    }

    /// Short hint describing accepted input, shown next to the label.
    pub fn hint(&self) -> String {
        match self.kind {
            FieldKind::Text => String::new(),
            FieldKind::Integer => "number".to_string(),
            FieldKind::Decimal => "amount".to_string(),
            FieldKind::Date => "YYYY-MM-DD or today".to_string(),
            FieldKind::Bool => "y/n".to_string(),
            FieldKind::Choice(choices) => choices
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}={}", i + 1, c))
                .collect::<Vec<_>>()
                .join(" "),
            FieldKind::List => "comma separated".to_string(),
        }
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| format!("'{}' is not a date (use YYYY-MM-DD)", raw))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_choice(raw: &str, choices: &'static [&'static str]) -> Option<&'static str> {
    if let Ok(n) = raw.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).copied();
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(raw))
        .copied()
}

/// Runtime representation of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Money),
    Date(NaiveDate),
    Bool(bool),
    Choice(String),
    List(Vec<String>),
}

impl FieldValue {
    /// A generated id as an integer field. Stores never hold ids above `i64::MAX`.
    pub fn id(id: u64) -> Self {
        FieldValue::Integer(i64::try_from(id).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => write!(f, "{}", s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(m) => write!(f, "{}", m),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Named field values collected from a prompt or extracted from a record.
///
/// A field can also be marked cleared: the user asked for an optional value
/// to be removed. Cleared fields have no value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(&'static str, FieldValue)>,
    cleared: Vec<&'static str>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn set(&mut self, name: &'static str, value: FieldValue) {
        self.cleared.retain(|n| *n != name);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: &'static str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn clear(&mut self, name: &'static str) {
        self.entries.retain(|(n, _)| *n != name);
        if !self.cleared.contains(&name) {
            self.cleared.push(name);
        }
    }

    pub fn is_cleared(&self, name: &str) -> bool {
        self.cleared.iter().any(|n| *n == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FieldValue)> {
        self.entries.iter()
    }

    pub fn text(&self, name: &str) -> Result<String> {
        match self.get(name) {
            Some(FieldValue::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(FieldValue::Text(_)) | None => Err(missing(name)),
            Some(_) => Err(mismatch(name, "text")),
        }
    }

    pub fn opt_text(&self, name: &str) -> Result<String> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Ok(s.trim().to_string()),
            None => Ok(String::new()),
            Some(_) => Err(mismatch(name, "text")),
        }
    }

    pub fn opt_integer(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            Some(FieldValue::Integer(n)) => Ok(Some(*n)),
            None => Ok(None),
            Some(_) => Err(mismatch(name, "a whole number")),
        }
    }

    pub fn decimal(&self, name: &str) -> Result<Money> {
        match self.get(name) {
            Some(FieldValue::Decimal(m)) => Ok(*m),
            None => Err(missing(name)),
            Some(_) => Err(mismatch(name, "an amount")),
        }
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate> {
        self.opt_date(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_date(&self, name: &str) -> Result<Option<NaiveDate>> {
        match self.get(name) {
            Some(FieldValue::Date(d)) => Ok(Some(*d)),
            None => Ok(None),
            Some(_) => Err(mismatch(name, "a date")),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.get(name) {
            Some(FieldValue::Bool(b)) => Ok(*b),
            None => Ok(default),
            Some(_) => Err(mismatch(name, "yes or no")),
        }
    }

    pub fn opt_choice(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            Some(FieldValue::Choice(c)) => Ok(Some(c)),
            None => Ok(None),
            Some(_) => Err(mismatch(name, "a choice")),
        }
    }

    pub fn list(&self, name: &str) -> Result<Vec<String>> {
        match self.get(name) {
            Some(FieldValue::List(items)) => Ok(items.clone()),
            None => Ok(Vec::new()),
            Some(_) => Err(mismatch(name, "a list")),
        }
    }
}

fn missing(name: &str) -> LogbookError {
    LogbookError::validation(name, "a value is required")
}

fn mismatch(name: &str, expected: &str) -> LogbookError {
    LogbookError::validation(name, format!("expected {}", expected))
}

/// A record type that can be built from, and broken into, field values.
pub trait Form: Record {
    /// Field table, in prompt order.
    fn fields() -> &'static [FieldSpec];

    fn to_values(&self) -> FieldValues;

    /// Build a new record. `next_seq` is the next free sequence number for
    /// collections with generated ids; others ignore it.
    fn from_values(values: &FieldValues, next_seq: u64) -> Result<Self>;

    /// Overwrite this record's editable fields. Absent fields keep their
    /// value; cleared fields go back to their empty default.
    fn apply_values(&mut self, values: &FieldValues) -> Result<()>;

    /// Build a key from the identity fields in `values`.
    fn key_from_values(values: &FieldValues) -> Result<Self::Key>;

    /// One-line description for list views.
    fn summary(&self) -> String;

    /// Creation time, rendered as a relative age in lists.
    fn timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        None
    }

    /// Fields that identify a record when selecting one.
    fn identity_fields() -> Vec<&'static FieldSpec> {
        Self::fields().iter().filter(|f| f.identity).collect()
    }

    /// Fields prompted for when adding or editing.
    fn editable_fields() -> Vec<&'static FieldSpec> {
        Self::fields().iter().filter(|f| !f.generated).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &[&str] = &["red", "green", "blue"];

    #[test]
    fn parses_integers_and_rejects_words() {
        let spec = FieldSpec::new("pages", "Pages", FieldKind::Integer);
        assert_eq!(spec.parse(" 42 ").unwrap(), FieldValue::Integer(42));

        let err = spec.parse("forty").unwrap_err();
        assert!(matches!(err, LogbookError::Validation { ref field, .. } if field == "Pages"));
        assert!(err.to_string().contains("'forty' is not a whole number"));
    }

    #[test]
    fn parses_choice_by_name_or_number() {
        let spec = FieldSpec::new("color", "Color", FieldKind::Choice(COLORS));
        assert_eq!(spec.parse("GREEN").unwrap(), FieldValue::Choice("green".into()));
        assert_eq!(spec.parse("3").unwrap(), FieldValue::Choice("blue".into()));
        assert!(spec.parse("0").is_err());
        assert!(spec.parse("4").is_err());
        assert!(spec.parse("purple").is_err());
    }

    #[test]
    fn parses_dates() {
        let spec = FieldSpec::new("due", "Due", FieldKind::Date);
        assert_eq!(
            spec.parse("2024-02-29").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(spec.parse("2023-02-29").is_err());
        assert!(spec.parse("29/02/2024").is_err());
        assert!(matches!(spec.parse("today").unwrap(), FieldValue::Date(_)));
    }

    #[test]
    fn parses_bools_and_lists() {
        let flag = FieldSpec::new("done", "Done", FieldKind::Bool);
        assert_eq!(flag.parse("Yes").unwrap(), FieldValue::Bool(true));
        assert_eq!(flag.parse("n").unwrap(), FieldValue::Bool(false));
        assert!(flag.parse("maybe").is_err());

        let tags = FieldSpec::new("tags", "Tags", FieldKind::List);
        assert_eq!(
            tags.parse("a, b,,c ").unwrap(),
            FieldValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn identity_implies_required() {
        let spec = FieldSpec::new("title", "Title", FieldKind::Text).identity();
        assert!(spec.required);
        assert!(spec.identity);
        assert!(!spec.generated);
    }

    #[test]
    fn field_values_replace_in_place() {
        let mut values = FieldValues::new()
            .with("a", FieldValue::Integer(1))
            .with("b", FieldValue::Text("x".into()));
        values.set("a", FieldValue::Integer(2));
        assert_eq!(values.opt_integer("a").unwrap(), Some(2));
        assert_eq!(values.iter().count(), 2);
    }

    #[test]
    fn clearing_drops_the_value_until_set_again() {
        let mut values = FieldValues::new().with("due", FieldValue::Integer(1));
        values.clear("due");
        assert!(values.get("due").is_none());
        assert!(values.is_cleared("due"));

        values.set("due", FieldValue::Integer(2));
        assert!(!values.is_cleared("due"));
        assert_eq!(values.opt_integer("due").unwrap(), Some(2));
    }

    #[test]
    fn blank_required_text_is_missing() {
        let values = FieldValues::new().with("title", FieldValue::Text("  ".into()));
        assert!(values.text("title").is_err());
        assert_eq!(values.opt_text("title").unwrap(), "");
    }
}
