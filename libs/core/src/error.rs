use std::fmt;

use thiserror::Error;

/// Kind of JSON value a field is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    NonNegativeInteger,
    Boolean,
    Object,
    Array,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "a string",
            ValueKind::Integer => "an integer",
            ValueKind::NonNegativeInteger => "a non-negative integer",
            ValueKind::Boolean => "a boolean",
            ValueKind::Object => "an object",
            ValueKind::Array => "an array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating, rendering or parsing skill objects.
///
/// Every variant is a construction-time failure; nothing here is retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SkillError {
    #[error("{value} must be {expected}")]
    TypeMismatch { value: String, expected: ValueKind },
    #[error("invalid link: {0}")]
    InvalidLink(String),
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("structural violation: {0}")]
    StructuralViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl SkillError {
    pub fn type_mismatch(value: impl Into<String>, expected: ValueKind) -> Self {
        SkillError::TypeMismatch {
            value: value.into(),
            expected,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        SkillError::StructuralViolation(message.into())
    }

    /// Short machine-friendly label used for tracing fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SkillError::TypeMismatch { .. } => "type_mismatch",
            SkillError::InvalidLink(_) => "invalid_link",
            SkillError::InvalidAction(_) => "invalid_action",
            SkillError::InvalidPayload(_) => "invalid_payload",
            SkillError::StructuralViolation(_) => "structural_violation",
            SkillError::NotFound(_) => "not_found",
        }
    }
}

impl From<serde_json::Error> for SkillError {
    fn from(err: serde_json::Error) -> Self {
        SkillError::InvalidPayload(err.to_string())
    }
}

pub type Result<T, E = SkillError> = std::result::Result<T, E>;
