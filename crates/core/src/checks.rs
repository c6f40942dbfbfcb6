//! Typed validators and the dispatcher that routes rules to them.
//!
//! Integer checks only accept [`FieldValue::Integer`] and string checks only
//! accept [`FieldValue::Text`]; the other family is a type mismatch.
//! Unsupported values are skipped before dispatch.

use crate::error::{DirectiveError, RuleFailure};
use crate::patterns::PatternCache;
use crate::rules::{Rule, RuleKind, join};
use crate::value::{FieldValue, ValueFamily};

/// Apply one rule to one field value.
pub fn apply_rule(
    rule: &Rule,
    value: FieldValue<'_>,
    patterns: &PatternCache,
) -> Result<(), RuleFailure> {
    if value.is_unsupported() {
        return Ok(());
    }

    let kind = rule.kind();
    match rule {
        Rule::NotZero => int_not_equals(kind, value, 0),
        Rule::Zero => int_equals(kind, value, 0),
        Rule::One => int_equals(kind, value, 1),
        Rule::PositiveInt => int_min(kind, value, 1),
        Rule::NonNegativeInt => int_min(kind, value, 0),
        Rule::NonPositiveInt => int_max(kind, value, 0),
        Rule::NegativeInt => int_max(kind, value, -1),
        Rule::MaxInt(max) => int_max(kind, value, *max),
        Rule::MinInt(min) => int_min(kind, value, *min),
        Rule::IntIn(elems) => int_in(kind, value, elems),
        Rule::IntNotIn(elems) => int_not_in(kind, value, elems),
        Rule::NotEmpty => check_text(
            kind,
            value,
            |text| text.is_empty(),
            |_| "is empty".to_string(),
        ),
        Rule::Empty => check_text(
            kind,
            value,
            |text| !text.is_empty(),
            |_| "is not empty".to_string(),
        ),
        Rule::NotBlank => check_text(
            kind,
            value,
            |text| text.trim().is_empty(),
            |_| "is blank".to_string(),
        ),
        Rule::MaxLength(max) => check_text(
            kind,
            value,
            |text| byte_len(text) > i128::from(*max),
            |_| format!("too long, max is {max}"),
        ),
        Rule::MinLength(min) => check_text(
            kind,
            value,
            |text| byte_len(text) < i128::from(*min),
            |_| format!("too short, min is {min}"),
        ),
        Rule::StringIn(elems) => check_text(
            kind,
            value,
            |text| !elems.iter().any(|elem| elem == text),
            |text| format!("expected [{}], actual is {text}", join(elems, " ")),
        ),
        Rule::StringNotIn(elems) => check_text(
            kind,
            value,
            |text| elems.iter().any(|elem| elem == text),
            |text| format!("not expected [{}], actual is {text}", join(elems, " ")),
        ),
        Rule::Regexp(pattern) => string_matches(rule, value, pattern, patterns),
    }
}

fn integer(rule: RuleKind, value: FieldValue<'_>) -> Result<i128, RuleFailure> {
    match value {
        FieldValue::Integer(actual) => Ok(actual),
        FieldValue::Text(_) | FieldValue::Unsupported => Err(RuleFailure::TypeMismatch {
            rule,
            expected: ValueFamily::Integer,
        }),
    }
}

fn text(rule: RuleKind, value: FieldValue<'_>) -> Result<&str, RuleFailure> {
    match value {
        FieldValue::Text(actual) => Ok(actual),
        FieldValue::Integer(_) | FieldValue::Unsupported => Err(RuleFailure::TypeMismatch {
            rule,
            expected: ValueFamily::Text,
        }),
    }
}

fn check_int(
    rule: RuleKind,
    value: FieldValue<'_>,
    fails: impl FnOnce(i128) -> bool,
    message: impl FnOnce(i128) -> String,
) -> Result<(), RuleFailure> {
    let actual = integer(rule, value)?;
    if fails(actual) {
        return Err(RuleFailure::violation(rule, message(actual)));
    }
    Ok(())
}

fn check_text(
    rule: RuleKind,
    value: FieldValue<'_>,
    fails: impl FnOnce(&str) -> bool,
    message: impl FnOnce(&str) -> String,
) -> Result<(), RuleFailure> {
    let actual = text(rule, value)?;
    if fails(actual) {
        return Err(RuleFailure::violation(rule, message(actual)));
    }
    Ok(())
}

fn int_equals(rule: RuleKind, value: FieldValue<'_>, expected: i64) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| actual != i128::from(expected),
        |actual| format!("expected equals, expected is {expected}, actual is {actual}"),
    )
}

fn int_not_equals(
    rule: RuleKind,
    value: FieldValue<'_>,
    unexpected: i64,
) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| actual == i128::from(unexpected),
        |actual| format!("expected not equals, unexpected is {unexpected}, actual is {actual}"),
    )
}

fn int_max(rule: RuleKind, value: FieldValue<'_>, max: i64) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| actual > i128::from(max),
        |_| format!("too large, max is {max}"),
    )
}

fn int_min(rule: RuleKind, value: FieldValue<'_>, min: i64) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| actual < i128::from(min),
        |_| format!("too small, min is {min}"),
    )
}

fn int_in(rule: RuleKind, value: FieldValue<'_>, elems: &[i64]) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| !contains(elems, actual),
        |actual| format!("expected [{}], actual is {actual}", join(elems, " ")),
    )
}

fn int_not_in(rule: RuleKind, value: FieldValue<'_>, elems: &[i64]) -> Result<(), RuleFailure> {
    check_int(
        rule,
        value,
        |actual| contains(elems, actual),
        |actual| format!("not expected [{}], actual is {actual}", join(elems, " ")),
    )
}

fn byte_len(text: &str) -> i128 {
    i128::try_from(text.len()).unwrap_or(i128::MAX)
}

fn contains(elems: &[i64], actual: i128) -> bool {
    elems.iter().any(|elem| i128::from(*elem) == actual)
}

fn string_matches(
    rule: &Rule,
    value: FieldValue<'_>,
    pattern: &str,
    patterns: &PatternCache,
) -> Result<(), RuleFailure> {
    let actual = text(RuleKind::Regexp, value)?;
    let compiled = patterns
        .compile(pattern)
        .map_err(|error| DirectiveError::InvalidPattern {
            directive: rule.to_string(),
            pattern: pattern.to_owned(),
            reason: error.to_string(),
        })?;

    if compiled.is_match(actual) {
        return Ok(());
    }
    Err(RuleFailure::violation(
        RuleKind::Regexp,
        format!("not match, format:{pattern}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn run(rule: &Rule, value: FieldValue<'_>) -> Result<(), RuleFailure> {
        apply_rule(rule, value, &PatternCache::default())
    }

    fn message(result: Result<(), RuleFailure>) -> Option<String> {
        result.err().map(|failure| failure.to_string())
    }

    #[test]
    fn integer_equality_rules() {
        assert!(run(&Rule::NotZero, FieldValue::Integer(3)).is_ok());
        assert_eq!(
            message(run(&Rule::NotZero, FieldValue::Integer(0))).as_deref(),
            Some("expected not equals, unexpected is 0, actual is 0")
        );
        assert!(run(&Rule::Zero, FieldValue::Integer(0)).is_ok());
        assert_eq!(
            message(run(&Rule::One, FieldValue::Integer(2))).as_deref(),
            Some("expected equals, expected is 1, actual is 2")
        );
    }

    #[test]
    fn integer_bound_rules() {
        assert_eq!(
            message(run(&Rule::MaxInt(10), FieldValue::Integer(11))).as_deref(),
            Some("too large, max is 10")
        );
        assert!(run(&Rule::MaxInt(10), FieldValue::Integer(10)).is_ok());
        assert_eq!(
            message(run(&Rule::MinInt(5), FieldValue::Integer(4))).as_deref(),
            Some("too small, min is 5")
        );
        assert!(run(&Rule::PositiveInt, FieldValue::Integer(1)).is_ok());
        assert!(run(&Rule::PositiveInt, FieldValue::Integer(0)).is_err());
        assert!(run(&Rule::NonNegativeInt, FieldValue::Integer(0)).is_ok());
        assert!(run(&Rule::NonPositiveInt, FieldValue::Integer(1)).is_err());
        assert_eq!(
            message(run(&Rule::NegativeInt, FieldValue::Integer(0))).as_deref(),
            Some("too large, max is -1")
        );
    }

    #[test]
    fn integer_membership_rules() {
        let elems = vec![1, 4, 8];
        assert!(run(&Rule::IntIn(elems.clone()), FieldValue::Integer(4)).is_ok());
        assert_eq!(
            message(run(&Rule::IntIn(elems.clone()), FieldValue::Integer(2))).as_deref(),
            Some("expected [1 4 8], actual is 2")
        );
        assert!(run(&Rule::IntNotIn(elems.clone()), FieldValue::Integer(2)).is_ok());
        assert_eq!(
            message(run(&Rule::IntNotIn(elems), FieldValue::Integer(8))).as_deref(),
            Some("not expected [1 4 8], actual is 8")
        );
    }

    #[test]
    fn string_rules() {
        assert_eq!(
            message(run(&Rule::NotEmpty, FieldValue::Text(""))).as_deref(),
            Some("is empty")
        );
        assert_eq!(
            message(run(&Rule::Empty, FieldValue::Text("x"))).as_deref(),
            Some("is not empty")
        );
        assert_eq!(
            message(run(&Rule::NotBlank, FieldValue::Text(" \t"))).as_deref(),
            Some("is blank")
        );
        assert_eq!(
            message(run(&Rule::MaxLength(3), FieldValue::Text("abcd"))).as_deref(),
            Some("too long, max is 3")
        );
        assert_eq!(
            message(run(&Rule::MinLength(3), FieldValue::Text("ab"))).as_deref(),
            Some("too short, min is 3")
        );
    }

    #[test]
    fn length_counts_utf8_bytes() {
        assert_eq!(
            message(run(&Rule::MaxLength(5), FieldValue::Text("héllo"))).as_deref(),
            Some("too long, max is 5")
        );
        assert!(run(&Rule::MaxLength(6), FieldValue::Text("héllo")).is_ok());
        assert!(run(&Rule::MinLength(4), FieldValue::Text("éé")).is_ok());
    }

    #[test]
    fn negative_length_bounds_are_accepted() {
        assert!(run(&Rule::MinLength(-1), FieldValue::Text("abc")).is_ok());
        assert!(run(&Rule::MinLength(-1), FieldValue::Text("")).is_ok());
        assert_eq!(
            message(run(&Rule::MaxLength(-1), FieldValue::Text(""))).as_deref(),
            Some("too long, max is -1")
        );
    }

    #[test]
    fn string_membership_rules() {
        let elems = vec!["aaa".to_string(), "bbb".to_string()];
        assert!(run(&Rule::StringIn(elems.clone()), FieldValue::Text("aaa")).is_ok());
        assert_eq!(
            message(run(&Rule::StringIn(elems.clone()), FieldValue::Text("a"))).as_deref(),
            Some("expected [aaa bbb], actual is a")
        );
        assert!(run(&Rule::StringNotIn(elems), FieldValue::Text("bbb")).is_err());
    }

    #[test]
    fn regexp_is_not_implicitly_anchored() {
        let unanchored = Rule::Regexp("[0-9]+".to_string());
        assert!(run(&unanchored, FieldValue::Text("abc123")).is_ok());

        let anchored = Rule::Regexp("^[0-9]+$".to_string());
        assert_eq!(
            message(run(&anchored, FieldValue::Text("abc123"))).as_deref(),
            Some("not match, format:^[0-9]+$")
        );
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let failure = run(&Rule::Regexp("(".to_string()), FieldValue::Text("x"));
        assert!(matches!(
            failure,
            Err(RuleFailure::Configuration(DirectiveError::InvalidPattern { ref pattern, .. }))
                if pattern == "("
        ));
    }

    #[test]
    fn wrong_family_is_a_type_mismatch() {
        let failure = run(&Rule::MaxLength(3), FieldValue::Integer(3));
        assert_eq!(
            failure.as_ref().err().map(RuleFailure::kind),
            Some(FailureKind::TypeMismatch)
        );
        assert_eq!(message(failure).as_deref(), Some("not string type"));

        let failure = run(&Rule::MaxInt(3), FieldValue::Text("3"));
        assert_eq!(message(failure).as_deref(), Some("not int type"));
    }

    #[test]
    fn unsupported_values_are_skipped() {
        assert!(run(&Rule::NotZero, FieldValue::Unsupported).is_ok());
        assert!(run(&Rule::Regexp("(".to_string()), FieldValue::Unsupported).is_ok());
    }
}
