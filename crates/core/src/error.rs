//! Failure types produced while validating a record.
//!
//! Three kinds of failure are kept apart:
//! - violations (a value broke a declared constraint)
//! - configuration errors (a known directive has an unparsable argument)
//! - type mismatches (a directive was attached to a field of the wrong family)
//!
//! Only the first one is about data. The other two are defects in how the
//! record type was annotated, and map to `ErrorKind::Invariant` envelopes.

use crate::rules::RuleKind;
use crate::value::ValueFamily;
use std::fmt;
use tagcheck_shared::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// A recognized directive whose argument could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// An integer argument (or list element) is not a base-10 integer.
    #[error("directive error: {directive}: invalid integer argument {argument:?}: {reason}")]
    InvalidInteger {
        /// Full directive token.
        directive: String,
        /// Offending argument text.
        argument: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// A length argument is not a base-10 integer.
    #[error("directive error: {directive}: invalid length argument {argument:?}: {reason}")]
    InvalidLength {
        /// Full directive token.
        directive: String,
        /// Offending argument text.
        argument: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// A `Regexp` pattern does not compile.
    #[error("directive error: {directive}: invalid pattern: {reason}")]
    InvalidPattern {
        /// Full directive token.
        directive: String,
        /// Pattern text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

impl DirectiveError {
    /// Returns the directive token that failed to parse.
    #[must_use]
    pub fn directive(&self) -> &str {
        match self {
            Self::InvalidInteger { directive, .. }
            | Self::InvalidLength { directive, .. }
            | Self::InvalidPattern { directive, .. } => directive,
        }
    }
}

/// Coarse failure category, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The value broke a constraint.
    Violation,
    /// A directive argument is malformed.
    Configuration,
    /// A directive was applied to the wrong value family.
    TypeMismatch,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Violation => formatter.write_str("violation"),
            Self::Configuration => formatter.write_str("configuration"),
            Self::TypeMismatch => formatter.write_str("type_mismatch"),
        }
    }
}

/// Failure of a single directive against a single value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleFailure {
    /// The value broke the rule.
    #[error("{message}")]
    Violation {
        /// Rule that failed.
        rule: RuleKind,
        /// Human-readable description including bound and actual value.
        message: String,
    },
    /// The directive itself is malformed.
    #[error(transparent)]
    Configuration(#[from] DirectiveError),
    /// The rule expects another value family.
    #[error("not {expected} type")]
    TypeMismatch {
        /// Rule that was applied.
        rule: RuleKind,
        /// Family the rule operates on.
        expected: ValueFamily,
    },
}

impl RuleFailure {
    /// Build a violation.
    pub fn violation(rule: RuleKind, message: impl Into<String>) -> Self {
        Self::Violation {
            rule,
            message: message.into(),
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Violation { .. } => FailureKind::Violation,
            Self::Configuration(_) => FailureKind::Configuration,
            Self::TypeMismatch { .. } => FailureKind::TypeMismatch,
        }
    }

    /// Returns the rule involved, when the directive parsed.
    #[must_use]
    pub const fn rule(&self) -> Option<RuleKind> {
        match self {
            Self::Violation { rule, .. } | Self::TypeMismatch { rule, .. } => Some(*rule),
            Self::Configuration(_) => None,
        }
    }
}

/// First failure found on a record, qualified by field name.
///
/// Displays as `<field-name>:<message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}:{failure}")]
pub struct FieldError {
    field: String,
    #[source]
    failure: RuleFailure,
}

impl FieldError {
    /// Qualify a rule failure with the field it happened on.
    pub fn new(field: impl Into<String>, failure: RuleFailure) -> Self {
        Self {
            field: field.into(),
            failure,
        }
    }

    /// Name of the failing field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Underlying rule failure.
    #[must_use]
    pub const fn failure(&self) -> &RuleFailure {
        &self.failure
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.failure.kind()
    }

    /// Returns true when the value broke a constraint.
    #[must_use]
    pub const fn is_violation(&self) -> bool {
        matches!(self.kind(), FailureKind::Violation)
    }

    /// Returns true when the failure is an annotation defect rather than bad data.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        !self.is_violation()
    }

    /// Message without the field prefix.
    #[must_use]
    pub fn message(&self) -> String {
        self.failure.to_string()
    }

    fn error_code(&self) -> ErrorCode {
        match self.kind() {
            FailureKind::Violation => ErrorCode::new("validate", "violation"),
            FailureKind::Configuration => ErrorCode::new("validate", "invalid_directive"),
            FailureKind::TypeMismatch => ErrorCode::new("validate", "type_mismatch"),
        }
    }
}

impl From<FieldError> for ErrorEnvelope {
    fn from(error: FieldError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = if error.is_violation() {
            Self::expected(code, message)
        } else {
            Self::invariant(code, message)
        };

        envelope = envelope.with_metadata("field", error.field.as_str());
        match &error.failure {
            RuleFailure::Violation { rule, .. } => {
                envelope = envelope.with_metadata("rule", rule.name());
            },
            RuleFailure::Configuration(source) => {
                envelope = envelope.with_metadata("directive", source.directive());
            },
            RuleFailure::TypeMismatch { rule, expected } => {
                envelope = envelope
                    .with_metadata("rule", rule.name())
                    .with_metadata("expected", expected.to_string());
            },
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagcheck_shared::ErrorKind;

    #[test]
    fn field_error_display_prefixes_field_name() {
        let error = FieldError::new(
            "Age",
            RuleFailure::violation(RuleKind::MaxInt, "too large, max is 10"),
        );
        assert_eq!(error.to_string(), "Age:too large, max is 10");
        assert_eq!(error.message(), "too large, max is 10");
        assert!(error.is_violation());
    }

    #[test]
    fn type_mismatch_names_expected_family() {
        let failure = RuleFailure::TypeMismatch {
            rule: RuleKind::MaxLength,
            expected: ValueFamily::Text,
        };
        assert_eq!(failure.to_string(), "not string type");
        assert_eq!(failure.kind(), FailureKind::TypeMismatch);
        assert_eq!(failure.rule(), Some(RuleKind::MaxLength));
    }

    #[test]
    fn violations_map_to_expected_envelopes() {
        let error = FieldError::new("Name", RuleFailure::violation(RuleKind::NotEmpty, "is empty"));
        let envelope: ErrorEnvelope = error.into();

        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert_eq!(envelope.code, ErrorCode::new("validate", "violation"));
        assert_eq!(envelope.message, "Name:is empty");
        assert_eq!(envelope.metadata.get("field").map(String::as_str), Some("Name"));
        assert_eq!(envelope.metadata.get("rule").map(String::as_str), Some("NotEmpty"));
    }

    #[test]
    fn configuration_errors_map_to_invariant_envelopes() {
        let source = DirectiveError::InvalidInteger {
            directive: "@MaxInt(abc)".to_string(),
            argument: "abc".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let error = FieldError::new("Count", RuleFailure::from(source));
        assert!(error.is_defect());

        let envelope: ErrorEnvelope = error.into();
        assert_eq!(envelope.kind, ErrorKind::Invariant);
        assert_eq!(envelope.code.code(), "invalid_directive");
        assert_eq!(
            envelope.metadata.get("directive").map(String::as_str),
            Some("@MaxInt(abc)")
        );
    }
}
