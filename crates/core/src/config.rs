//! Validator configuration: schema, file loading, and env overrides.
//!
//! Precedence (highest wins):
//! - env overrides ([`ConfigEnv`])
//! - config file (JSON or TOML)
//! - defaults ([`ValidatorConfig::default`])

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tagcheck_shared::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// Env var: enable the compiled pattern cache.
pub const ENV_PATTERN_CACHE_ENABLED: &str = "TAGCHECK_PATTERN_CACHE_ENABLED";
/// Env var: max number of cached patterns.
pub const ENV_PATTERN_CACHE_CAPACITY: &str = "TAGCHECK_PATTERN_CACHE_CAPACITY";
/// Env var: compiled size limit for a single pattern, in bytes.
pub const ENV_PATTERN_SIZE_LIMIT: &str = "TAGCHECK_PATTERN_SIZE_LIMIT";

const ENV_VARS: [&str; 3] = [
    ENV_PATTERN_CACHE_ENABLED,
    ENV_PATTERN_CACHE_CAPACITY,
    ENV_PATTERN_SIZE_LIMIT,
];

/// Default max number of cached patterns.
pub const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 256;
/// Default compiled size limit for a single pattern (10 MiB).
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Top-level validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ValidatorConfig {
    /// `@Regexp` compilation settings.
    pub patterns: PatternConfig,
}

/// Settings for compiling `@Regexp` patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PatternConfig {
    /// Memoize compiled patterns by pattern text.
    pub cache_enabled: bool,
    /// Max number of cached patterns.
    pub cache_capacity: usize,
    /// Compiled size limit for a single pattern, in bytes.
    pub size_limit: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_capacity: DEFAULT_PATTERN_CACHE_CAPACITY,
            size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config JSON did not parse.
    #[error("invalid config JSON: {reason}")]
    InvalidJson {
        /// Parser diagnostic.
        reason: String,
    },
    /// Config TOML did not parse.
    #[error("invalid config TOML: {reason}")]
    InvalidToml {
        /// Parser diagnostic.
        reason: String,
    },
    /// Config file could not be read.
    #[error("failed to read config file: {reason}")]
    Read {
        /// Path that was read.
        path: String,
        /// I/O diagnostic.
        reason: String,
    },
    /// Config file extension is neither `.json` nor `.toml`.
    #[error("unsupported config format; use .json or .toml")]
    UnsupportedFormat {
        /// Offending extension.
        extension: String,
    },
    /// An env var was present but empty after trimming.
    #[error("{var} must be non-empty")]
    EmptyEnvValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    #[error("{var} must be a boolean")]
    InvalidEnvBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    #[error("{var} must be an integer")]
    InvalidEnvInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// A limit that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroLimit {
        /// Config field name.
        field: &'static str,
    },
}

impl ConfigError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson { .. } => ErrorCode::new("config", "invalid_json"),
            Self::InvalidToml { .. } => ErrorCode::new("config", "invalid_toml"),
            Self::Read { .. } => ErrorCode::new("config", "config_file_io"),
            Self::UnsupportedFormat { .. } => ErrorCode::new("config", "unsupported_format"),
            Self::EmptyEnvValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnvBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidEnvInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::ZeroLimit { .. } => ErrorCode::new("config", "limit_out_of_range"),
        }
    }
}

impl From<ConfigError> for ErrorEnvelope {
    fn from(error: ConfigError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = if matches!(error, ConfigError::Read { .. }) {
            Self::unexpected(code, message)
        } else {
            Self::expected(code, message)
        };

        match error {
            ConfigError::InvalidJson { .. } | ConfigError::InvalidToml { .. } => envelope,
            ConfigError::Read { path, .. } => envelope.with_metadata("path", path),
            ConfigError::UnsupportedFormat { extension } => {
                envelope.with_metadata("extension", extension)
            },
            ConfigError::EmptyEnvValue { var } => envelope.with_metadata("env_var", var),
            ConfigError::InvalidEnvBool { var, value }
            | ConfigError::InvalidEnvInt { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
            ConfigError::ZeroLimit { field } => envelope.with_metadata("field", field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ValidatorConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        parse_config(input, ConfigFormat::Json)?.validate_and_normalize()
    }

    /// Parse and validate a TOML config document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        parse_config(input, ConfigFormat::Toml)?.validate_and_normalize()
    }

    /// Load a config file, picking the format from its extension.
    ///
    /// No extension or `.json` parses as JSON; `.toml` parses as TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = detect_config_format(path)?;
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_string_lossy().to_string(),
            reason: error.to_string(),
        })?;
        parse_config(&text, format)?.validate_and_normalize()
    }

    /// Apply env overrides on top of this config and re-validate.
    pub fn with_env(mut self, env: &ConfigEnv) -> Result<Self, ConfigError> {
        if let Some(enabled) = env.pattern_cache_enabled {
            self.patterns.cache_enabled = enabled;
        }
        if let Some(capacity) = env.pattern_cache_capacity {
            self.patterns.cache_capacity = capacity;
        }
        if let Some(limit) = env.pattern_size_limit {
            self.patterns.size_limit = limit;
        }
        self.validate_and_normalize()
    }

    /// Check limits. A zero capacity is allowed and simply disables caching.
    pub fn validate_and_normalize(mut self) -> Result<Self, ConfigError> {
        if self.patterns.size_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "patterns.sizeLimit",
            });
        }
        if self.patterns.cache_capacity == 0 {
            self.patterns.cache_enabled = false;
        }
        Ok(self)
    }
}

/// Env overrides for [`ValidatorConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    /// Override for `patterns.cacheEnabled`.
    pub pattern_cache_enabled: Option<bool>,
    /// Override for `patterns.cacheCapacity`.
    pub pattern_cache_capacity: Option<usize>,
    /// Override for `patterns.sizeLimit`.
    pub pattern_size_limit: Option<usize>,
}

impl ConfigEnv {
    /// Parse overrides from a name → value map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern_cache_enabled: parse_optional_bool(map, ENV_PATTERN_CACHE_ENABLED)?,
            pattern_cache_capacity: parse_optional_usize(map, ENV_PATTERN_CACHE_CAPACITY)?,
            pattern_size_limit: parse_optional_usize(map, ENV_PATTERN_SIZE_LIMIT)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse overrides by asking `lookup` for each recognized variable.
    pub fn from_lookup(
        mut lookup: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let map: BTreeMap<String, String> = ENV_VARS
            .iter()
            .filter_map(|name| lookup(name).map(|value| ((*name).to_string(), value)))
            .collect();
        Self::from_map(&map)
    }
}

fn parse_config(input: &str, format: ConfigFormat) -> Result<ValidatorConfig, ConfigError> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ConfigError::InvalidJson {
                reason: error.to_string(),
            }
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| ConfigError::InvalidToml {
            reason: error.to_string(),
        }),
    }
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ConfigError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyEnvValue { var });
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidEnvBool {
            var,
            value: raw.clone(),
        }),
    }
}

fn parse_optional_usize(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyEnvValue { var });
    }

    trimmed
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnvInt {
            var,
            value: raw.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tagcheck_shared::ErrorKind;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn defaults_enable_a_bounded_cache() {
        let config = ValidatorConfig::default();
        assert!(config.patterns.cache_enabled);
        assert_eq!(config.patterns.cache_capacity, DEFAULT_PATTERN_CACHE_CAPACITY);
        assert_eq!(config.patterns.size_limit, DEFAULT_PATTERN_SIZE_LIMIT);
    }

    #[test]
    fn json_and_toml_fill_missing_fields_with_defaults() -> Result<(), Box<dyn Error>> {
        let json = ValidatorConfig::from_json_str(r#"{"patterns":{"cacheCapacity":8}}"#)?;
        assert_eq!(json.patterns.cache_capacity, 8);
        assert!(json.patterns.cache_enabled);

        let toml = ValidatorConfig::from_toml_str("[patterns]\ncacheEnabled = false\n")?;
        assert!(!toml.patterns.cache_enabled);
        assert_eq!(toml.patterns.size_limit, DEFAULT_PATTERN_SIZE_LIMIT);
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = ValidatorConfig::from_json_str(r#"{"patterns":{"cacheSize":8}}"#);
        assert!(matches!(result, Err(ConfigError::InvalidJson { .. })));
    }

    #[test]
    fn zero_size_limit_is_rejected() {
        let result = ValidatorConfig::from_json_str(r#"{"patterns":{"sizeLimit":0}}"#);
        assert_eq!(
            result,
            Err(ConfigError::ZeroLimit {
                field: "patterns.sizeLimit"
            })
        );
    }

    #[test]
    fn zero_capacity_disables_caching() -> Result<(), ConfigError> {
        let config = ValidatorConfig::from_json_str(r#"{"patterns":{"cacheCapacity":0}}"#)?;
        assert!(!config.patterns.cache_enabled);
        Ok(())
    }

    #[test]
    fn env_overrides_win() -> Result<(), ConfigError> {
        let env = ConfigEnv::from_map(&env_map(&[
            (ENV_PATTERN_CACHE_ENABLED, "off"),
            (ENV_PATTERN_SIZE_LIMIT, " 4096 "),
        ]))?;
        let config = ValidatorConfig::default().with_env(&env)?;

        assert!(!config.patterns.cache_enabled);
        assert_eq!(config.patterns.size_limit, 4096);
        assert_eq!(config.patterns.cache_capacity, DEFAULT_PATTERN_CACHE_CAPACITY);
        Ok(())
    }

    #[test]
    fn env_parsing_is_strict() {
        let error = ConfigEnv::from_map(&env_map(&[(ENV_PATTERN_CACHE_ENABLED, "maybe")]));
        assert!(matches!(error, Err(ConfigError::InvalidEnvBool { .. })));

        let error = ConfigEnv::from_map(&env_map(&[(ENV_PATTERN_CACHE_CAPACITY, "-1")]));
        assert!(matches!(error, Err(ConfigError::InvalidEnvInt { .. })));

        let error = ConfigEnv::from_map(&env_map(&[(ENV_PATTERN_SIZE_LIMIT, "  ")]));
        assert_eq!(
            error,
            Err(ConfigError::EmptyEnvValue {
                var: ENV_PATTERN_SIZE_LIMIT
            })
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = ValidatorConfig::load_from_path(Path::new("validator.yaml"));
        assert_eq!(
            result,
            Err(ConfigError::UnsupportedFormat {
                extension: "yaml".to_string()
            })
        );
    }

    #[test]
    fn config_errors_map_into_envelopes() {
        let envelope: ErrorEnvelope = ConfigError::InvalidEnvInt {
            var: ENV_PATTERN_CACHE_CAPACITY,
            value: "ten".to_string(),
        }
        .into();

        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_int"));
        assert_eq!(
            envelope.metadata.get("env_var").map(String::as_str),
            Some(ENV_PATTERN_CACHE_CAPACITY)
        );
        assert_eq!(envelope.metadata.get("value").map(String::as_str), Some("ten"));
        assert_eq!(envelope.kind, ErrorKind::Expected);
    }

    #[test]
    fn missing_file_is_an_unexpected_error() -> Result<(), Box<dyn Error>> {
        let Err(error) = ValidatorConfig::load_from_path(Path::new("/nonexistent/tagcheck.toml"))
        else {
            return Err("expected a read error".into());
        };
        assert!(matches!(error, ConfigError::Read { .. }));

        let envelope: ErrorEnvelope = error.into();
        assert_eq!(envelope.kind, ErrorKind::Unexpected);
        assert_eq!(
            envelope.metadata.get("path").map(String::as_str),
            Some("/nonexistent/tagcheck.toml")
        );
        Ok(())
    }

    #[test]
    fn lookup_reads_only_known_vars() -> Result<(), Box<dyn Error>> {
        let vars = env_map(&[
            (ENV_PATTERN_CACHE_CAPACITY, "8"),
            (ENV_PATTERN_SIZE_LIMIT, "4096"),
            ("TAGCHECK_UNRELATED", "x"),
        ]);
        let mut asked = Vec::new();
        let env = ConfigEnv::from_lookup(|name| {
            asked.push(name.to_string());
            vars.get(name).cloned()
        })?;

        assert_eq!(asked, ENV_VARS.map(str::to_string).to_vec());
        assert_eq!(env, ConfigEnv::from_map(&vars)?);
        assert_eq!(env.pattern_cache_enabled, None);
        assert_eq!(env.pattern_cache_capacity, Some(8));

        let config = ValidatorConfig::default().with_env(&env)?;
        assert_eq!(config.patterns.size_limit, 4096);
        Ok(())
    }

    #[test]
    fn lookup_rejects_invalid_values() {
        let result = ConfigEnv::from_lookup(|name| {
            (name == ENV_PATTERN_CACHE_ENABLED).then(|| "maybe".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnvBool { .. })));
    }

    #[test]
    fn std_env_matches_lookup() {
        let from_std = ConfigEnv::from_std_env();
        let from_lookup = ConfigEnv::from_lookup(|name| std::env::var(name).ok());
        assert_eq!(from_std, from_lookup);
    }
}
