//! # tagcheck-core
//!
//! Directive-driven validation of struct fields.
//!
//! Each field carries a directive string such as `@MaxInt(10);@MinInt(5)`.
//! The engine splits it, parses every token into a typed [`Rule`], and runs
//! the rule against the field's runtime value. The first failure is reported
//! as a [`FieldError`] of the form `<field-name>:<message>`.
//!
//! ```
//! # #[cfg(feature = "derive")]
//! # {
//! use tagcheck_core::{Validate, validate};
//!
//! #[derive(Validate)]
//! struct Account {
//!     #[validate("@NotBlank;@MaxLength(16)")]
//!     handle: String,
//!     #[validate("@IntIn(1, 4, 8)")]
//!     tier: u8,
//! }
//!
//! let account = Account { handle: "ferris".into(), tier: 2 };
//! let error = validate(&account).unwrap_err();
//! assert_eq!(error.to_string(), "tier:expected [1 4 8], actual is 2");
//! # }
//! ```
//!
//! ## Failure kinds
//!
//! - violations: the value broke a constraint
//! - configuration errors: a recognized directive has a malformed argument
//! - type mismatches: an integer directive on a text field, or vice versa
//!
//! Unrecognized tokens are ignored, so annotations written for newer
//! directive sets keep working.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Typed validators and rule dispatch.
pub mod checks;
/// Validator configuration and loading.
pub mod config;
/// Entry point and struct walker.
pub mod engine;
/// Failure types.
pub mod error;
/// Compiled pattern cache.
pub mod patterns;
/// Record capability and shape resolution.
pub mod record;
/// Directive grammar and rule model.
pub mod rules;
/// Runtime field values.
pub mod value;

pub use checks::apply_rule;
pub use config::{ConfigEnv, ConfigError, PatternConfig, ValidatorConfig};
pub use engine::{Validator, default_validator, validate};
pub use error::{DirectiveError, FailureKind, FieldError, RuleFailure};
pub use patterns::PatternCache;
pub use record::{FieldDescriptor, FieldSet, Record, Shape, Validatable};
pub use rules::{
    ARGUMENT_SEPARATOR, DIRECTIVE_DELIMITER, Rule, RuleKind, parse_directive, parse_directives,
    split_directives,
};
pub use value::{AsFieldValue, FieldValue, ValueFamily};

pub use tagcheck_shared::{ErrorCode, ErrorEnvelope, ErrorKind};

#[cfg(feature = "derive")]
pub use tagcheck_validate_derive::Validate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_leave_the_crate_as_envelopes() -> Result<(), Box<dyn std::error::Error>> {
        let record = FieldSet::new()
            .with_field("Name", "@NotBlank", FieldValue::Text("ada"))
            .with_field("Retries", "@MaxLength(2)", FieldValue::Integer(3));

        let Err(error) = validate(&record) else {
            return Err("expected a type mismatch".into());
        };
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(envelope.kind, ErrorKind::Invariant);
        assert_eq!(envelope.code, ErrorCode::new("validate", "type_mismatch"));
        assert_eq!(envelope.message, "Retries:not string type");
        assert_eq!(envelope.metadata.get("expected").map(String::as_str), Some("string"));
        Ok(())
    }
}
