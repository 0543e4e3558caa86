#![forbid(unsafe_code)]

//! Built-in field validators for shape checks.
//!
//! Each constructor returns a [`Rule`], which implements
//! [`Validate`](cprops_core::Validate) and can be placed straight into a
//! [`ValidatorMap`].
//!
//! A field that is absent or `Null` passes unless the rule is
//! [`required`](Rule::required).
//!
//! ```
//! use cprops_core::{ValidationConfig, ValidatorMap, check_shape, props};
//! use cprops_rules as rules;
//!
//! let validators = ValidatorMap::new()
//!     .with("count", rules::int().required())
//!     .with("tags", rules::list_of(rules::string()));
//!
//! let report = check_shape(
//!     &validators,
//!     &props! { "tags" => cprops_core::Value::list(["a", "b"]) },
//!     "TagList",
//!     &ValidationConfig::default(),
//! );
//! assert_eq!(
//!     report.diagnostics()[0].message,
//!     "Required prop `count` was not specified in `TagList`."
//! );
//! ```

use std::fmt;

use cprops_core::{Props, Validate, ValidatorMap, Value};

#[derive(Clone)]
enum Check {
    Any,
    Number,
    Int,
    Str,
    Bool,
    List,
    Map,
    ListOf(Box<Rule>),
    Shape(ValidatorMap),
    OneOf(Vec<Value>),
}

/// A field validator built from one of this crate's constructors.
#[derive(Clone)]
pub struct Rule {
    check: Check,
    required: bool,
}

impl Rule {
    const fn new(check: Check) -> Self {
        Self {
            check,
            required: false,
        }
    }

    /// Treat an absent or `Null` field as a failure.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// What the rule accepts, as named in diagnostics.
    #[must_use]
    pub fn expected(&self) -> String {
        match &self.check {
            Check::Any => "any".to_owned(),
            Check::Number => "number".to_owned(),
            Check::Int => "int".to_owned(),
            Check::Str => "string".to_owned(),
            Check::Bool => "bool".to_owned(),
            Check::List => "list".to_owned(),
            Check::Map => "map".to_owned(),
            Check::ListOf(inner) => format!("list of {}", inner.expected()),
            Check::Shape(_) => "shape".to_owned(),
            Check::OneOf(values) => {
                let names: Vec<String> = values.iter().map(describe).collect();
                format!("one of [{}]", names.join(", "))
            }
        }
    }

    /// Check a single value found under `path`.
    fn check_value(&self, value: Option<&Value>, path: &str, label: &str) -> Option<String> {
        let value = match value {
            None | Some(Value::Null) if self.required => {
                return Some(format!(
                    "Required prop `{path}` was not specified in `{label}`."
                ));
            }
            None | Some(Value::Null) => return None,
            Some(value) => value,
        };

        let invalid = || {
            Some(format!(
                "Invalid prop `{path}` supplied to `{label}`, expected `{}`.",
                self.expected()
            ))
        };

        match &self.check {
            Check::Any => None,
            Check::Number => (!value.is_number()).then(invalid).flatten(),
            Check::Int => value.as_i64().is_none().then(invalid).flatten(),
            Check::Str => value.as_str().is_none().then(invalid).flatten(),
            Check::Bool => value.as_bool().is_none().then(invalid).flatten(),
            Check::List => value.as_list().is_none().then(invalid).flatten(),
            Check::Map => value.as_map().is_none().then(invalid).flatten(),
            Check::ListOf(inner) => match value.as_list() {
                Some(items) => items.iter().enumerate().find_map(|(index, item)| {
                    inner.check_value(Some(item), &format!("{path}[{index}]"), label)
                }),
                None => invalid(),
            },
            Check::Shape(validators) => match value.as_map() {
                Some(nested) => shape_failure(validators, nested, path, label),
                None => invalid(),
            },
            Check::OneOf(values) => (!values.contains(value)).then(invalid).flatten(),
        }
    }
}

impl Validate for Rule {
    fn validate(&self, target: &Props, key: &str, label: &str) -> Option<String> {
        self.check_value(target.get(key), key, label)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("expected", &self.expected())
            .field("required", &self.required)
            .finish()
    }
}

/// Run nested validators with every key qualified by the parent path, so a
/// failure names `item.id` rather than `id`.
fn shape_failure(
    validators: &ValidatorMap,
    nested: &Props,
    path: &str,
    label: &str,
) -> Option<String> {
    let qualified: Props = nested
        .iter()
        .map(|(key, value)| (format!("{path}.{key}"), value.clone()))
        .collect();
    validators.iter().find_map(|(key, validator)| {
        validator
            .validate(&qualified, &format!("{path}.{key}"), label)
            .filter(|message| !message.is_empty())
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{s:?}"),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        other => other.kind().to_owned(),
    }
}

/// Accepts any present value.
#[must_use]
pub const fn any() -> Rule {
    Rule::new(Check::Any)
}

/// Integer or float.
#[must_use]
pub const fn number() -> Rule {
    Rule::new(Check::Number)
}

#[must_use]
pub const fn int() -> Rule {
    Rule::new(Check::Int)
}

#[must_use]
pub const fn string() -> Rule {
    Rule::new(Check::Str)
}

#[must_use]
pub const fn bool() -> Rule {
    Rule::new(Check::Bool)
}

#[must_use]
pub const fn list() -> Rule {
    Rule::new(Check::List)
}

#[must_use]
pub const fn map() -> Rule {
    Rule::new(Check::Map)
}

/// A list whose every element satisfies `rule`.
#[must_use]
pub fn list_of(rule: Rule) -> Rule {
    Rule::new(Check::ListOf(Box::new(rule)))
}

/// A map whose fields pass every validator in `validators`.
#[must_use]
pub fn shape(validators: ValidatorMap) -> Rule {
    Rule::new(Check::Shape(validators))
}

/// A value structurally equal to one of `values`.
#[must_use]
pub fn one_of<I>(values: I) -> Rule
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Rule::new(Check::OneOf(values.into_iter().map(Into::into).collect()))
}
