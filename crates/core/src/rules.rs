//! Directive grammar: splitting, parsing, and the typed [`Rule`] model.
//!
//! ```text
//! directive-string := directive (';' directive)*
//! directive        := '@' NAME [ '(' ARGLIST ')' ]
//! ARGLIST          := ARG (',' ARG)*
//! ```
//!
//! Parsing is strict for recognized directives (a malformed argument is a
//! [`DirectiveError`]) and lenient for everything else: unknown tokens parse
//! to `None` and are skipped by the walker.

use crate::error::DirectiveError;
use crate::value::ValueFamily;
use std::fmt;

/// Separator between directives in one directive string.
pub const DIRECTIVE_DELIMITER: char = ';';

/// Separator between list arguments.
pub const ARGUMENT_SEPARATOR: char = ',';

/// Argument-free tag of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Integer is not zero.
    NotZero,
    /// Integer is zero.
    Zero,
    /// Integer is one.
    One,
    /// String has at least one character.
    NotEmpty,
    /// String has no characters.
    Empty,
    /// String has a non-whitespace character.
    NotBlank,
    /// Integer is at least 1.
    PositiveInt,
    /// Integer is at least 0.
    NonNegativeInt,
    /// Integer is at most 0.
    NonPositiveInt,
    /// Integer is at most -1.
    NegativeInt,
    /// String matches a regular expression.
    Regexp,
    /// String length upper bound.
    MaxLength,
    /// String length lower bound.
    MinLength,
    /// Integer upper bound.
    MaxInt,
    /// Integer lower bound.
    MinInt,
    /// Integer is one of a list.
    IntIn,
    /// Integer is none of a list.
    IntNotIn,
    /// String is one of a list.
    StringIn,
    /// String is none of a list.
    StringNotIn,
}

impl RuleKind {
    /// Directive name without the leading `@`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotZero => "NotZero",
            Self::Zero => "Zero",
            Self::One => "One",
            Self::NotEmpty => "NotEmpty",
            Self::Empty => "Empty",
            Self::NotBlank => "NotBlank",
            Self::PositiveInt => "PositiveInt",
            Self::NonNegativeInt => "NonNegativeInt",
            Self::NonPositiveInt => "NonPositiveInt",
            Self::NegativeInt => "NegativeInt",
            Self::Regexp => "Regexp",
            Self::MaxLength => "MaxLength",
            Self::MinLength => "MinLength",
            Self::MaxInt => "MaxInt",
            Self::MinInt => "MinInt",
            Self::IntIn => "IntIn",
            Self::IntNotIn => "IntNotIn",
            Self::StringIn => "StringIn",
            Self::StringNotIn => "StringNotIn",
        }
    }

    /// Value family the rule validates.
    #[must_use]
    pub const fn family(self) -> ValueFamily {
        match self {
            Self::NotZero
            | Self::Zero
            | Self::One
            | Self::PositiveInt
            | Self::NonNegativeInt
            | Self::NonPositiveInt
            | Self::NegativeInt
            | Self::MaxInt
            | Self::MinInt
            | Self::IntIn
            | Self::IntNotIn => ValueFamily::Integer,
            Self::NotEmpty
            | Self::Empty
            | Self::NotBlank
            | Self::Regexp
            | Self::MaxLength
            | Self::MinLength
            | Self::StringIn
            | Self::StringNotIn => ValueFamily::Text,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// A parsed directive with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `@NotZero`
    NotZero,
    /// `@Zero`
    Zero,
    /// `@One`
    One,
    /// `@NotEmpty`
    NotEmpty,
    /// `@Empty`
    Empty,
    /// `@NotBlank`
    NotBlank,
    /// `@PositiveInt`
    PositiveInt,
    /// `@NonNegativeInt`
    NonNegativeInt,
    /// `@NonPositiveInt`
    NonPositiveInt,
    /// `@NegativeInt`
    NegativeInt,
    /// `@Regexp(pattern)`; the pattern is not implicitly anchored.
    Regexp(String),
    /// `@MaxLength(n)`, in UTF-8 bytes. A negative bound rejects every string.
    MaxLength(i64),
    /// `@MinLength(n)`, in UTF-8 bytes. A negative bound accepts every string.
    MinLength(i64),
    /// `@MaxInt(n)`
    MaxInt(i64),
    /// `@MinInt(n)`
    MinInt(i64),
    /// `@IntIn(a, b, ...)`
    IntIn(Vec<i64>),
    /// `@IntNotIn(a, b, ...)`
    IntNotIn(Vec<i64>),
    /// `@StringIn(a, b, ...)`
    StringIn(Vec<String>),
    /// `@StringNotIn(a, b, ...)`
    StringNotIn(Vec<String>),
}

impl Rule {
    /// Argument-free tag.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::NotZero => RuleKind::NotZero,
            Self::Zero => RuleKind::Zero,
            Self::One => RuleKind::One,
            Self::NotEmpty => RuleKind::NotEmpty,
            Self::Empty => RuleKind::Empty,
            Self::NotBlank => RuleKind::NotBlank,
            Self::PositiveInt => RuleKind::PositiveInt,
            Self::NonNegativeInt => RuleKind::NonNegativeInt,
            Self::NonPositiveInt => RuleKind::NonPositiveInt,
            Self::NegativeInt => RuleKind::NegativeInt,
            Self::Regexp(_) => RuleKind::Regexp,
            Self::MaxLength(_) => RuleKind::MaxLength,
            Self::MinLength(_) => RuleKind::MinLength,
            Self::MaxInt(_) => RuleKind::MaxInt,
            Self::MinInt(_) => RuleKind::MinInt,
            Self::IntIn(_) => RuleKind::IntIn,
            Self::IntNotIn(_) => RuleKind::IntNotIn,
            Self::StringIn(_) => RuleKind::StringIn,
            Self::StringNotIn(_) => RuleKind::StringNotIn,
        }
    }
}

/// Renders the canonical directive text, e.g. `@IntIn(1,4,8)`.
impl fmt::Display for Rule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::Regexp(pattern) => write!(formatter, "@{name}({pattern})"),
            Self::MaxLength(bound)
            | Self::MinLength(bound)
            | Self::MaxInt(bound)
            | Self::MinInt(bound) => write!(formatter, "@{name}({bound})"),
            Self::IntIn(elems) | Self::IntNotIn(elems) => {
                write!(formatter, "@{name}({})", join(elems, ","))
            },
            Self::StringIn(elems) | Self::StringNotIn(elems) => {
                write!(formatter, "@{name}({})", join(elems, ","))
            },
            _ => write!(formatter, "@{name}"),
        }
    }
}

pub(crate) fn join<T: fmt::Display>(elems: &[T], separator: &str) -> String {
    elems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Split a directive string into trimmed, non-empty tokens.
///
/// Splitting is purely lexical: a `;` inside an argument still splits.
pub fn split_directives(directives: &str) -> impl Iterator<Item = &str> {
    directives
        .split(DIRECTIVE_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Parse one trimmed directive token.
///
/// Returns `Ok(None)` for tokens that are not recognized directives.
pub fn parse_directive(token: &str) -> Result<Option<Rule>, DirectiveError> {
    if let Some(rule) = parse_bare(token) {
        return Ok(Some(rule));
    }

    for (kind, build) in PARAMETERIZED {
        if let Some(raw) = argument_text(token, kind.name()) {
            return build(token, raw).map(Some);
        }
    }

    Ok(None)
}

/// Parse every recognized directive of a directive string, in order.
///
/// Useful for checking annotations up front; unknown tokens are skipped.
pub fn parse_directives(directives: &str) -> Result<Vec<Rule>, DirectiveError> {
    let mut rules = Vec::new();
    for token in split_directives(directives) {
        if let Some(rule) = parse_directive(token)? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

fn parse_bare(token: &str) -> Option<Rule> {
    let rule = match token {
        "@NotZero" => Rule::NotZero,
        "@Zero" => Rule::Zero,
        "@One" => Rule::One,
        "@NotEmpty" => Rule::NotEmpty,
        "@Empty" => Rule::Empty,
        "@NotBlank" => Rule::NotBlank,
        "@PositiveInt" => Rule::PositiveInt,
        "@NonNegativeInt" => Rule::NonNegativeInt,
        "@NonPositiveInt" => Rule::NonPositiveInt,
        "@NegativeInt" => Rule::NegativeInt,
        _ => return None,
    };
    Some(rule)
}

type ArgumentParser = fn(&str, &str) -> Result<Rule, DirectiveError>;

// Checked in order; the first `@Name(` prefix with a `)` suffix wins.
const PARAMETERIZED: [(RuleKind, ArgumentParser); 9] = [
    (RuleKind::Regexp, regexp_rule),
    (RuleKind::MaxLength, max_length_rule),
    (RuleKind::MaxInt, max_int_rule),
    (RuleKind::MinLength, min_length_rule),
    (RuleKind::MinInt, min_int_rule),
    (RuleKind::IntIn, int_in_rule),
    (RuleKind::IntNotIn, int_not_in_rule),
    (RuleKind::StringNotIn, string_not_in_rule),
    (RuleKind::StringIn, string_in_rule),
];

fn argument_text<'t>(token: &'t str, name: &str) -> Option<&'t str> {
    token
        .strip_prefix('@')?
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn regexp_rule(_token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    Ok(Rule::Regexp(raw.to_owned()))
}

fn max_length_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_length(token, raw).map(Rule::MaxLength)
}

fn min_length_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_length(token, raw).map(Rule::MinLength)
}

fn max_int_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_integer(token, raw).map(Rule::MaxInt)
}

fn min_int_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_integer(token, raw).map(Rule::MinInt)
}

fn int_in_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_integer_list(token, raw).map(Rule::IntIn)
}

fn int_not_in_rule(token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    parse_integer_list(token, raw).map(Rule::IntNotIn)
}

fn string_in_rule(_token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    Ok(Rule::StringIn(parse_string_list(raw)))
}

fn string_not_in_rule(_token: &str, raw: &str) -> Result<Rule, DirectiveError> {
    Ok(Rule::StringNotIn(parse_string_list(raw)))
}

fn parse_integer(token: &str, raw: &str) -> Result<i64, DirectiveError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|error| DirectiveError::InvalidInteger {
            directive: token.to_owned(),
            argument: trimmed.to_owned(),
            reason: error.to_string(),
        })
}

fn parse_length(token: &str, raw: &str) -> Result<i64, DirectiveError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|error| DirectiveError::InvalidLength {
            directive: token.to_owned(),
            argument: trimmed.to_owned(),
            reason: error.to_string(),
        })
}

fn parse_integer_list(token: &str, raw: &str) -> Result<Vec<i64>, DirectiveError> {
    raw.split(ARGUMENT_SEPARATOR)
        .map(|elem| parse_integer(token, elem))
        .collect()
}

fn parse_string_list(raw: &str) -> Vec<String> {
    raw.split(ARGUMENT_SEPARATOR)
        .map(|elem| elem.trim().to_owned())
        .collect()
}
