use thiserror::Error;

pub type Result<T> = std::result::Result<T, CpropsError>;

/// Errors raised by the fallible helpers around the transform pipeline.
///
/// Validation failures are never reported through this type: they are
/// diagnostics (see [`crate::validate`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CpropsError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing field `{key}`")]
    MissingField { key: String },

    #[error("field `{key}`: {source}")]
    Field {
        key: String,
        #[source]
        source: Box<CpropsError>,
    },

    #[error("invalid value for {name}: {value:?}")]
    InvalidFlag { name: String, value: String },
}

impl CpropsError {
    #[must_use]
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Attach the field key to an error produced while reading that field.
    #[must_use]
    pub fn in_field(self, key: impl Into<String>) -> Self {
        Self::Field {
            key: key.into(),
            source: Box::new(self),
        }
    }

    #[must_use]
    pub fn invalid_flag(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFlag {
            name: name.into(),
            value: value.into(),
        }
    }
}
