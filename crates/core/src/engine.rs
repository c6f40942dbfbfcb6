//! Entry point and struct walker.
//!
//! The walker evaluates fields in declaration order and, inside a field,
//! directives in written order. It stops at the first failure of any kind;
//! failures are never aggregated.

use crate::checks::apply_rule;
use crate::config::{ConfigEnv, ConfigError, ValidatorConfig};
use crate::error::{FieldError, RuleFailure};
use crate::patterns::PatternCache;
use crate::record::{FieldDescriptor, Record, Shape, Validatable};
use crate::rules::{parse_directive, split_directives};
use crate::value::FieldValue;
use std::sync::LazyLock;

static DEFAULT_VALIDATOR: LazyLock<Validator> = LazyLock::new(Validator::default);

/// Validate a value with the process-wide default [`Validator`].
///
/// Records are walked; a single reference or smart pointer to a record is
/// dereferenced once. Anything else succeeds without being inspected.
///
/// # Example
///
/// ```
/// use tagcheck_core::{FieldSet, FieldValue, validate};
///
/// let record = FieldSet::new().with_field("Age", "@MaxInt(10);@MinInt(5)", FieldValue::Integer(18));
/// let error = validate(&record).unwrap_err();
/// assert_eq!(error.to_string(), "Age:too large, max is 10");
///
/// assert!(validate(&42_i32).is_ok());
/// ```
pub fn validate<T: Validatable + ?Sized>(value: &T) -> Result<(), FieldError> {
    DEFAULT_VALIDATOR.validate(value)
}

/// Returns the process-wide default validator.
#[must_use]
pub fn default_validator() -> &'static Validator {
    &DEFAULT_VALIDATOR
}

/// Validation engine: configuration plus the compiled pattern cache.
///
/// A `Validator` holds no per-call state and can be shared across threads.
#[derive(Debug, Default)]
pub struct Validator {
    config: ValidatorConfig,
    patterns: PatternCache,
}

impl Validator {
    /// Create a validator with explicit configuration.
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        let patterns = PatternCache::new(config.patterns.clone());
        Self { config, patterns }
    }

    /// Create a validator from defaults plus process env overrides.
    pub fn from_std_env() -> Result<Self, ConfigError> {
        Self::from_env(&ConfigEnv::from_std_env()?)
    }

    /// Create a validator from defaults plus the given overrides.
    pub fn from_env(env: &ConfigEnv) -> Result<Self, ConfigError> {
        let config = ValidatorConfig::default().with_env(env)?;
        Ok(Self::new(config))
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Compiled pattern cache.
    #[must_use]
    pub const fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Validate a value of unknown shape.
    pub fn validate<T: Validatable + ?Sized>(&self, value: &T) -> Result<(), FieldError> {
        match value.shape() {
            Shape::Record(record) => self.validate_record(record),
            Shape::Indirect(target) => match target.shape() {
                Shape::Record(record) => self.validate_record(record),
                other @ (Shape::Indirect(_) | Shape::Opaque) => {
                    tracing::trace!(shape = other.label(), "pointer target is not a record");
                    Ok(())
                },
            },
            Shape::Opaque => Ok(()),
        }
    }

    /// Walk a record's fields in order, stopping at the first failure.
    pub fn validate_record<R: Record + ?Sized>(&self, record: &R) -> Result<(), FieldError> {
        for field in record.fields() {
            self.validate_field(&field)?;
        }
        Ok(())
    }

    /// Validate a single field descriptor.
    pub fn validate_field(&self, field: &FieldDescriptor<'_>) -> Result<(), FieldError> {
        self.apply_directives(field.directives, field.value)
            .map_err(|failure| {
                tracing::debug!(
                    field = field.name,
                    kind = %failure.kind(),
                    "field failed validation"
                );
                FieldError::new(field.name, failure)
            })
    }

    fn apply_directives(&self, directives: &str, value: FieldValue<'_>) -> Result<(), RuleFailure> {
        for token in split_directives(directives) {
            let Some(rule) = parse_directive(token)? else {
                tracing::trace!(directive = token, "ignoring unrecognized directive");
                continue;
            };
            tracing::trace!(rule = rule.kind().name(), "applying directive");
            apply_rule(&rule, value, &self.patterns)?;
        }
        Ok(())
    }
}
