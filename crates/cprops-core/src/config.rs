#![forbid(unsafe_code)]

//! Validation configuration.
//!
//! Whether shape checks run, and what a failed check does, is an explicit
//! [`ValidationConfig`] value handed to the validator constructors. Hosts
//! resolve it once at startup, typically with [`ValidationConfig::from_env`].
//!
//! # Environment
//!
//! | Variable | Effect |
//! |---|---|
//! | `CPROPS_ENV` | `production` disables checks |
//! | `CPROPS_CONSTRAINED_HOST` | truthy keeps checks enabled even in production |
//! | `CPROPS_VALIDATION_MODE` | `gating` or `advisory` |
//! | `CPROPS_DIAGNOSTIC_LEVEL` | `warn` or `error` |
//!
//! The constrained-host flag takes precedence over the production flag.

use std::env;

use crate::error::{CpropsError, Result};

pub const ENV_BUILD_MODE: &str = "CPROPS_ENV";
pub const ENV_CONSTRAINED_HOST: &str = "CPROPS_CONSTRAINED_HOST";
pub const ENV_VALIDATION_MODE: &str = "CPROPS_VALIDATION_MODE";
pub const ENV_DIAGNOSTIC_LEVEL: &str = "CPROPS_DIAGNOSTIC_LEVEL";

/// What a shape validator does when a field fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValidationMode {
    /// Report diagnostics and halt the pipeline.
    #[default]
    Gating,
    /// Report diagnostics and pass props through unchanged.
    Advisory,
}

/// Level at which diagnostics are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    #[default]
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidationConfig {
    /// When false, validators are never called and nothing is reported.
    pub enabled: bool,
    pub mode: ValidationMode,
    pub severity: Severity,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: ValidationMode::default(),
            severity: Severity::default(),
        }
    }
}

impl ValidationConfig {
    /// Checks on, report only.
    #[must_use]
    pub fn advisory() -> Self {
        Self::default().with_mode(ValidationMode::Advisory)
    }

    /// Checks off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults. Unrecognised values are errors
    /// rather than silently ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        let production = lookup(ENV_BUILD_MODE)
            .is_some_and(|val| val.trim().eq_ignore_ascii_case("production"));
        let constrained_host = match lookup(ENV_CONSTRAINED_HOST) {
            Some(val) => parse_flag(ENV_CONSTRAINED_HOST, &val)?,
            None => false,
        };
        config.enabled = constrained_host || !production;

        if let Some(val) = lookup(ENV_VALIDATION_MODE) {
            config.mode = match val.trim().to_ascii_lowercase().as_str() {
                "gating" | "gate" => ValidationMode::Gating,
                "advisory" | "advise" => ValidationMode::Advisory,
                _ => return Err(CpropsError::invalid_flag(ENV_VALIDATION_MODE, val)),
            };
        }
        if let Some(val) = lookup(ENV_DIAGNOSTIC_LEVEL) {
            config.severity = match val.trim().to_ascii_lowercase().as_str() {
                "warn" | "warning" => Severity::Warn,
                "error" => Severity::Error,
                _ => return Err(CpropsError::invalid_flag(ENV_DIAGNOSTIC_LEVEL, val)),
            };
        }

        Ok(config)
    }
}

fn parse_flag(name: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CpropsError::invalid_flag(name, val)),
    }
}
