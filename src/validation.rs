//! Data-driven form validation.
//!
//! A [`Schema`] maps field paths to an ordered list of [`Rule`]s (a predicate
//! plus the message shown when it fails). Schemas compose: a nested record,
//! an optional nested record, or a list of records can each be validated by
//! their own schema under a path prefix, so both form schemas are built from
//! the same small set of parts and never need bespoke per-field code.
//!
//! Only the first failing rule of a field is reported, and every field is
//! checked, so a single pass yields the complete error map for display.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Landline numbers are stored as 14 digits (`00` + country code + national number).
pub fn landline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{14}$").expect("static pattern compiles"))
}

/// Mobile numbers are stored as 10 digits (national number without the leading zero).
pub fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{10}$").expect("static pattern compiles"))
}

/// RFC 5322 simplified: local@domain.tld, at least one dot in the domain.
pub fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
        )
        .expect("static pattern compiles")
    })
}

/// Field path -> human-readable message, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Records an error for `path`. The first error recorded for a path wins.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when no errors were recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.0.len())?;
        for (i, (path, message)) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} ({})", sep, path, message)?;
        }
        Ok(())
    }
}

/// The value a schema field reads out of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Free text; `None` when the field is absent.
    Text(Option<&'a str>),
    /// Numeric magnitude or count; `None` when absent.
    Number(Option<f64>),
    Flag(bool),
    /// Multi-select of scalar values.
    Items(Vec<&'a str>),
    /// Length of a list of nested records.
    Count(usize),
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(Some(value.as_str()))
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        FieldValue::Text(value.as_deref())
    }
}

impl<'a> From<&'a Vec<String>> for FieldValue<'a> {
    fn from(value: &'a Vec<String>) -> Self {
        FieldValue::Items(value.iter().map(String::as_str).collect())
    }
}

impl From<Option<i64>> for FieldValue<'_> {
    fn from(value: Option<i64>) -> Self {
        FieldValue::Number(value.map(|v| v as f64))
    }
}

impl From<Option<f64>> for FieldValue<'_> {
    fn from(value: Option<f64>) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// A single check applied to a [`FieldValue`].
///
/// Every predicate except `Required`, `Equals` and `IsTrue` passes on an absent
/// or empty value; presence is `Required`'s job.
#[derive(Debug, Clone)]
pub enum Predicate {
    Required,
    Pattern(Regex),
    MaxLength(usize),
    Email,
    Min(f64),
    Max(f64),
    /// Value (or every item) must be one of the listed values.
    OneOf(Vec<String>),
    Equals(String),
    IsTrue,
    MaxItems(usize),
}

impl Predicate {
    pub fn holds(&self, value: &FieldValue<'_>) -> bool {
        match self {
            Predicate::Required => match value {
                FieldValue::Text(text) => text.is_some_and(|s| !s.trim().is_empty()),
                FieldValue::Number(number) => number.is_some_and(f64::is_finite),
                FieldValue::Flag(_) => true,
                FieldValue::Items(items) => !items.is_empty(),
                FieldValue::Count(count) => *count > 0,
            },
            Predicate::Pattern(re) => each_text(value, |s| re.is_match(s)),
            Predicate::MaxLength(max) => each_text(value, |s| s.chars().count() <= *max),
            Predicate::Email => each_text(value, |s| email_pattern().is_match(s)),
            Predicate::Min(min) => match value {
                FieldValue::Number(number) => number.map_or(true, |n| n >= *min),
                FieldValue::Count(count) => *count as f64 >= *min,
                _ => true,
            },
            Predicate::Max(max) => match value {
                FieldValue::Number(number) => number.map_or(true, |n| n <= *max),
                FieldValue::Count(count) => *count as f64 <= *max,
                _ => true,
            },
            Predicate::OneOf(allowed) => each_text(value, |s| allowed.iter().any(|a| a == s)),
            Predicate::Equals(expected) => {
                matches!(value, FieldValue::Text(Some(s)) if *s == expected.as_str())
            }
            Predicate::IsTrue => matches!(value, FieldValue::Flag(true)),
            Predicate::MaxItems(max) => match value {
                FieldValue::Items(items) => items.len() <= *max,
                FieldValue::Count(count) => count <= max,
                _ => true,
            },
        }
    }
}

/// Applies `check` to non-empty text, or to every item of a multi-select.
fn each_text(value: &FieldValue<'_>, check: impl Fn(&str) -> bool) -> bool {
    match value {
        FieldValue::Text(Some(s)) if !s.is_empty() => check(s),
        FieldValue::Items(items) => items.iter().all(|s| check(s)),
        _ => true,
    }
}

/// A predicate and the message reported when it fails.
#[derive(Debug, Clone)]
pub struct Rule {
    pub predicate: Predicate,
    pub message: String,
}

impl Rule {
    pub fn new(predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Predicate::Required, message)
    }

    pub fn pattern(re: &Regex, message: impl Into<String>) -> Self {
        Self::new(Predicate::Pattern(re.clone()), message)
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(Predicate::MaxLength(max), message)
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(Predicate::Email, message)
    }

    pub fn min(min: f64, message: impl Into<String>) -> Self {
        Self::new(Predicate::Min(min), message)
    }

    pub fn max(max: f64, message: impl Into<String>) -> Self {
        Self::new(Predicate::Max(max), message)
    }

    pub fn one_of(allowed: Vec<String>, message: impl Into<String>) -> Self {
        Self::new(Predicate::OneOf(allowed), message)
    }

    pub fn equals(expected: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Predicate::Equals(expected.into()), message)
    }

    pub fn is_true(message: impl Into<String>) -> Self {
        Self::new(Predicate::IsTrue, message)
    }

    pub fn max_items(max: usize, message: impl Into<String>) -> Self {
        Self::new(Predicate::MaxItems(max), message)
    }
}

type Accessor<T> = Box<dyn for<'a> Fn(&'a T) -> FieldValue<'a> + Send + Sync>;
type CrossCheck<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;
type Composite<T> = Box<dyn Fn(&T, &str, &mut ValidationErrors) + Send + Sync>;

enum Entry<T> {
    Field {
        path: &'static str,
        accessor: Accessor<T>,
        rules: Vec<Rule>,
    },
    Check {
        path: &'static str,
        check: CrossCheck<T>,
    },
    Composite(Composite<T>),
}

/// Declarative validator for records of type `T`.
pub struct Schema<T> {
    entries: Vec<Entry<T>>,
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a leaf field with its ordered rules.
    pub fn field<F>(mut self, path: &'static str, accessor: F, rules: Vec<Rule>) -> Self
    where
        F: for<'a> Fn(&'a T) -> FieldValue<'a> + Send + Sync + 'static,
    {
        self.entries.push(Entry::Field {
            path,
            accessor: Box::new(accessor),
            rules,
        });
        self
    }

    /// Adds a cross-field rule reported under `path`.
    pub fn check<F>(mut self, path: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.entries.push(Entry::Check {
            path,
            check: Box::new(check),
        });
        self
    }

    /// Validates a nested record under `path`.
    pub fn nested<U, F>(mut self, path: &'static str, accessor: F, schema: Schema<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> &U + Send + Sync + 'static,
    {
        self.entries.push(Entry::Composite(Box::new(
            move |value: &T, prefix: &str, errors: &mut ValidationErrors| {
                schema.collect(accessor(value), &join(prefix, path), errors);
            },
        )));
        self
    }

    /// Validates a nested record under `path` only when it is present.
    pub fn optional<U, F>(mut self, path: &'static str, accessor: F, schema: Schema<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> Option<&U> + Send + Sync + 'static,
    {
        self.entries.push(Entry::Composite(Box::new(
            move |value: &T, prefix: &str, errors: &mut ValidationErrors| {
                if let Some(inner) = accessor(value) {
                    schema.collect(inner, &join(prefix, path), errors);
                }
            },
        )));
        self
    }

    /// Validates every element of a list under `path[i]`.
    pub fn each<U, F>(mut self, path: &'static str, accessor: F, schema: Schema<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> &[U] + Send + Sync + 'static,
    {
        self.entries.push(Entry::Composite(Box::new(
            move |value: &T, prefix: &str, errors: &mut ValidationErrors| {
                let base = join(prefix, path);
                for (i, item) in accessor(value).iter().enumerate() {
                    schema.collect(item, &format!("{}[{}]", base, i), errors);
                }
            },
        )));
        self
    }

    /// Runs every rule and returns the complete error map on failure.
    pub fn validate(&self, value: &T) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        self.collect(value, "", &mut errors);
        errors.into_result()
    }

    /// Records errors for `value` with every path prefixed by `prefix`.
    pub fn collect(&self, value: &T, prefix: &str, errors: &mut ValidationErrors) {
        for entry in &self.entries {
            match entry {
                Entry::Field {
                    path,
                    accessor,
                    rules,
                } => {
                    let field = accessor(value);
                    if let Some(rule) = rules.iter().find(|r| !r.predicate.holds(&field)) {
                        errors.insert(join(prefix, path), rule.message.clone());
                    }
                }
                Entry::Check { path, check } => {
                    if let Some(message) = check(value) {
                        errors.insert(join(prefix, path), message);
                    }
                }
                Entry::Composite(composite) => composite(value, prefix, errors),
            }
        }
    }
}

fn join(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}.{}", prefix, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Person {
        name: String,
        nickname: Option<String>,
        age: Option<i64>,
    }

    #[derive(Default)]
    struct Team {
        title: String,
        lead: Person,
        deputy: Option<Person>,
        members: Vec<Person>,
        tags: Vec<String>,
    }

    fn person_schema() -> Schema<Person> {
        Schema::new()
            .field(
                "name",
                |p: &Person| FieldValue::from(&p.name),
                vec![
                    Rule::required("Name is required"),
                    Rule::max_length(5, "Name is too long"),
                ],
            )
            .field(
                "nickname",
                |p: &Person| FieldValue::from(&p.nickname),
                vec![Rule::max_length(3, "Nickname is too long")],
            )
            .field(
                "age",
                |p: &Person| FieldValue::from(p.age),
                vec![Rule::required("Age is required"), Rule::min(1.0, "Age is required")],
            )
    }

    fn team_schema() -> Schema<Team> {
        Schema::new()
            .field(
                "title",
                |t: &Team| FieldValue::from(&t.title),
                vec![Rule::equals("Core", "Title must be Core")],
            )
            .nested("lead", |t: &Team| &t.lead, person_schema())
            .optional("deputy", |t: &Team| t.deputy.as_ref(), person_schema())
            .each("members", |t: &Team| t.members.as_slice(), person_schema())
            .field(
                "tags",
                |t: &Team| FieldValue::from(&t.tags),
                vec![
                    Rule::required("Pick a tag"),
                    Rule::one_of(vec!["a".into(), "b".into()], "Unknown tag"),
                ],
            )
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let person = Person {
            name: String::new(),
            nickname: None,
            age: Some(0),
        };
        let errors = person_schema().validate(&person).unwrap_err();

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("age"), Some("Age is required"));
        assert!(!errors.contains("nickname"));
    }

    #[test]
    fn test_optional_text_skips_non_presence_rules() {
        let person = Person {
            name: "Ann".into(),
            nickname: None,
            age: Some(30),
        };
        assert!(person_schema().validate(&person).is_ok());
    }

    #[test]
    fn test_nested_and_list_paths() {
        let team = Team {
            title: "Core".into(),
            lead: Person {
                name: "Ann".into(),
                nickname: None,
                age: Some(40),
            },
            deputy: Some(Person::default()),
            members: vec![
                Person {
                    name: "Bob".into(),
                    nickname: Some("Bobby".into()),
                    age: Some(22),
                },
                Person::default(),
            ],
            tags: vec!["a".into(), "z".into()],
        };

        let errors = team_schema().validate(&team).unwrap_err();
        let paths: Vec<&str> = errors.paths().collect();

        assert_eq!(
            paths,
            vec![
                "deputy.age",
                "deputy.name",
                "members[0].nickname",
                "members[1].age",
                "members[1].name",
                "tags",
            ]
        );
        assert_eq!(errors.get("tags"), Some("Unknown tag"));
    }

    #[test]
    fn test_equals_rejects_absent_and_other_values() {
        let pred = Predicate::Equals("United Kingdom".into());
        assert!(pred.holds(&FieldValue::Text(Some("United Kingdom"))));
        assert!(!pred.holds(&FieldValue::Text(Some("France"))));
        assert!(!pred.holds(&FieldValue::Text(None)));
    }

    #[test]
    fn test_cross_field_check() {
        let schema = person_schema().check("nickname", |p: &Person| {
            (p.nickname.is_none() && p.name == "Ann").then(|| "Ann needs a nickname".to_string())
        });
        let person = Person {
            name: "Ann".into(),
            nickname: None,
            age: Some(3),
        };
        let errors = schema.validate(&person).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("nickname"), Some("Ann needs a nickname"));
    }

    #[test]
    fn test_phone_patterns() {
        assert!(landline_pattern().is_match("00441234567890"));
        assert!(!landline_pattern().is_match("441234567890"));
        assert!(!landline_pattern().is_match("0044 1234567890"));
        assert!(mobile_pattern().is_match("7700900123"));
        assert!(!mobile_pattern().is_match("07700900123"));
    }

    #[test]
    fn test_display_lists_paths() {
        let mut errors = ValidationErrors::default();
        errors.insert("b", "second");
        errors.insert("a", "first");
        errors.insert("a", "ignored");
        assert_eq!(errors.to_string(), "2 invalid field(s): a (first); b (second)");
    }
}
