#![forbid(unsafe_code)]

//! Shape validation of props or state against per-key validators.
//!
//! A validator is anything implementing [`Validate`]: a function of
//! `(target, key, label)` returning `Some(message)` when `target[key]` is not
//! acceptable. Closures of that shape implement it directly.
//!
//! Every failing field produces one [`Diagnostic`], emitted through `tracing`
//! under the `cprops::validate` target at the configured [`Severity`]. A
//! failure is data: it never panics and never produces an `Err`.
//!
//! What happens to the pipeline depends on [`ValidationMode`]:
//!
//! - `Gating`: any failure turns the step into [`Outcome::Halted`].
//! - `Advisory`: props pass through unchanged whatever the outcome.

use std::fmt;
use std::rc::Rc;

use crate::config::{Severity, ValidationConfig, ValidationMode};
use crate::transform::{Outcome, Transform};
use crate::value::{Props, State};

pub const DEFAULT_PROPS_LABEL: &str = "setPropTypes Checker";
pub const DEFAULT_STATE_LABEL: &str = "setStateTypes Checker";
pub const DEFAULT_SHAPE_LABEL: &str = "shape Checker";

/// Check one field of `target`.
pub trait Validate {
    /// `Some(message)` when `target[key]` fails. An empty message counts as
    /// a pass.
    fn validate(&self, target: &Props, key: &str, label: &str) -> Option<String>;
}

impl<F> Validate for F
where
    F: Fn(&Props, &str, &str) -> Option<String>,
{
    fn validate(&self, target: &Props, key: &str, label: &str) -> Option<String> {
        self(target, key, label)
    }
}

/// A shared, type-erased validator.
pub type Validator = Rc<dyn Validate>;

/// Ordered mapping from field key to validator.
///
/// Iteration follows insertion order; inserting an existing key replaces its
/// validator in place.
#[derive(Clone, Default)]
pub struct ValidatorMap {
    entries: Vec<(String, Validator)>,
}

impl ValidatorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, validator: impl Validate + 'static) -> Self {
        self.insert(key, validator);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, validator: impl Validate + 'static) {
        self.insert_shared(key, Rc::new(validator));
    }

    pub fn insert_shared(&mut self, key: impl Into<String>, validator: Validator) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = validator,
            None => self.entries.push((key, validator)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Validate)> {
        self.entries
            .iter()
            .map(|(key, validator)| (key.as_str(), validator.as_ref()))
    }

    /// Run every validator against `target`, returning the first message.
    ///
    /// Nothing is reported and the configuration is not consulted.
    #[must_use]
    pub fn first_failure(&self, target: &Props, label: &str) -> Option<String> {
        self.iter()
            .find_map(|(key, validator)| failure(validator, target, key, label))
    }
}

impl fmt::Debug for ValidatorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub key: String,
    pub label: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of [`check_shape`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeReport {
    diagnostics: Vec<Diagnostic>,
    checked: bool,
}

impl ShapeReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// False when checks were disabled and no validator ran.
    #[must_use]
    pub fn was_checked(&self) -> bool {
        self.checked
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

fn failure(validator: &dyn Validate, target: &Props, key: &str, label: &str) -> Option<String> {
    validator
        .validate(target, key, label)
        .filter(|message| !message.is_empty())
}

fn emit(severity: Severity, diagnostic: &Diagnostic) {
    match severity {
        Severity::Warn => tracing::warn!(
            target: "cprops::validate",
            key = %diagnostic.key,
            label = %diagnostic.label,
            "{}",
            diagnostic.message
        ),
        Severity::Error => tracing::error!(
            target: "cprops::validate",
            key = %diagnostic.key,
            label = %diagnostic.label,
            "{}",
            diagnostic.message
        ),
    }
}

/// Check every field of `target` named in `validators`.
///
/// All failing fields are reported, in validator order. With checks disabled
/// no validator runs and the report is empty.
pub fn check_shape(
    validators: &ValidatorMap,
    target: &Props,
    label: &str,
    config: &ValidationConfig,
) -> ShapeReport {
    if !config.enabled {
        return ShapeReport::default();
    }
    let diagnostics: Vec<Diagnostic> = validators
        .iter()
        .filter_map(|(key, validator)| {
            let message = failure(validator, target, key, label)?;
            let diagnostic = Diagnostic {
                key: key.to_owned(),
                label: label.to_owned(),
                message,
            };
            emit(config.severity, &diagnostic);
            Some(diagnostic)
        })
        .collect();
    ShapeReport {
        diagnostics,
        checked: true,
    }
}

/// Which object a [`SetTypes`] transform validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTarget {
    Props,
    State,
}

/// Transform produced by [`set_prop_types`] and [`set_state_types`].
///
/// On success props pass through untouched: validation never reshapes them.
#[derive(Debug, Clone)]
pub struct SetTypes {
    validators: ValidatorMap,
    label: String,
    config: ValidationConfig,
    target: ShapeTarget,
}

impl SetTypes {
    /// Name reported in diagnostics, usually the view-model's name.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn target(&self) -> ShapeTarget {
        self.target
    }

    #[must_use]
    pub fn validation_config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run the check without turning it into a pipeline outcome.
    pub fn check(&self, state: &State, props: &Props) -> ShapeReport {
        let target = match self.target {
            ShapeTarget::Props => props,
            ShapeTarget::State => state,
        };
        check_shape(&self.validators, target, &self.label, &self.config)
    }
}

impl Transform for SetTypes {
    fn apply(&self, state: &State, props: Props) -> Outcome {
        let report = self.check(state, &props);
        if report.has_errors() && self.config.mode == ValidationMode::Gating {
            tracing::debug!(
                message = "props.validate.halt",
                label = %self.label,
                failures = report.diagnostics().len()
            );
            return Outcome::Halted;
        }
        Outcome::Props(props)
    }
}

/// Validate props against `validators`.
///
/// ```
/// use cprops_core::{Outcome, Props, Transform, ValidatorMap, set_prop_types, props};
///
/// let validators = ValidatorMap::new().with("a", |target: &Props, key: &str, label: &str| {
///     (!target.get(key).is_some_and(|v| v.is_number()))
///         .then(|| format!("`{key}` in `{label}` must be a number"))
/// });
/// let check = set_prop_types(validators).label("Counter");
///
/// assert_eq!(check.apply(&props! {}, props! { "a" => 1 }), Outcome::Props(props! { "a" => 1 }));
/// assert!(check.apply(&props! {}, props! { "a" => "1" }).is_halted());
/// ```
#[must_use]
pub fn set_prop_types(validators: ValidatorMap) -> SetTypes {
    SetTypes {
        validators,
        label: DEFAULT_PROPS_LABEL.to_owned(),
        config: ValidationConfig::default(),
        target: ShapeTarget::Props,
    }
}

/// Validate state against `validators`; props pass through.
#[must_use]
pub fn set_state_types(validators: ValidatorMap) -> SetTypes {
    SetTypes {
        validators,
        label: DEFAULT_STATE_LABEL.to_owned(),
        config: ValidationConfig::default(),
        target: ShapeTarget::State,
    }
}
