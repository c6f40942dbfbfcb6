//! Structured error envelope.
//!
//! Typed errors from the workspace crates (`FieldError`, `ConfigError`) are
//! flattened into an [`ErrorEnvelope`] when they leave the library: a kind,
//! a stable `namespace:code` identifier, the rendered message, and string
//! metadata naming the field, rule, or env var involved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Diagnostic key/value pairs carried by an envelope.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input broke a declared constraint.
    Expected,
    /// The declaration itself is wrong (malformed directive, wrong value family).
    Invariant,
    /// The environment failed (unreadable config file).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        })
    }
}

/// Stable `namespace:code` identifier, e.g. `validate:violation`.
///
/// Serializes as the joined string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Build a code from its two parts.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Part before the `:`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Part after the `:`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// A string that is not `namespace:code` with both parts non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(String);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "malformed error code {:?}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once(':') {
            Some((namespace, code)) if !namespace.is_empty() && !code.is_empty() => {
                Ok(Self::new(namespace, code))
            },
            _ => Err(InvalidErrorCode(input.to_owned())),
        }
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.to_string()
    }
}

/// Flattened error handed to callers outside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Fault category.
    pub kind: ErrorKind,
    /// Stable identifier.
    pub code: ErrorCode,
    /// Rendered message of the source error.
    pub message: String,
    /// Diagnostic context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    /// Envelope with empty metadata.
    pub fn new(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            metadata: ErrorMetadata::new(),
        }
    }

    /// Shorthand for [`ErrorKind::Expected`].
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expected, code, message)
    }

    /// Shorthand for [`ErrorKind::Invariant`].
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invariant, code, message)
    }

    /// Shorthand for [`ErrorKind::Unexpected`].
    pub fn unexpected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, code, message)
    }

    /// Returns true when the error points at a declaration defect rather than bad data.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        matches!(self.kind, ErrorKind::Invariant)
    }

    /// Attach one metadata entry, replacing any previous value for the key.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[{}] {}: {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}
