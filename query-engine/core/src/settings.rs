use crate::{error::CoreError, CoreResult};
use quaint::connector::IsolationLevel;
use serde::{Deserialize, Serialize};

pub const ISOLATION_LEVEL_VAR: &str = "CONTENT_ISOLATION_LEVEL";
pub const DEFER_CONSTRAINTS_VAR: &str = "CONTENT_DEFER_CONSTRAINTS";
pub const LOG_QUERIES_VAR: &str = "CONTENT_LOG_QUERIES";

/// How mutations talk to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationSettings {
    #[serde(with = "isolation_level")]
    pub isolation_level: IsolationLevel,
    /// Defer foreign key checks while a delete walks its cascade.
    pub defer_constraints: bool,
    /// Log every statement with its parameters at debug level.
    pub log_queries: bool,
}

impl Default for MutationSettings {
    fn default() -> Self {
        MutationSettings {
            isolation_level: IsolationLevel::RepeatableRead,
            defer_constraints: true,
            log_queries: false,
        }
    }
}

impl MutationSettings {
    /// Defaults overridden by the `CONTENT_*` environment variables.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut settings = MutationSettings::default();

        if let Some(level) = lookup(ISOLATION_LEVEL_VAR) {
            settings.isolation_level = level
                .parse()
                .map_err(|err| CoreError::ConfigurationError(format!("{ISOLATION_LEVEL_VAR}: {err}")))?;
        }

        if let Some(flag) = lookup(DEFER_CONSTRAINTS_VAR) {
            settings.defer_constraints = parse_flag(DEFER_CONSTRAINTS_VAR, &flag)?;
        }

        if let Some(flag) = lookup(LOG_QUERIES_VAR) {
            settings.log_queries = parse_flag(LOG_QUERIES_VAR, &flag)?;
        }

        Ok(settings)
    }
}

fn parse_flag(name: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::ConfigurationError(format!(
            "{name}: expected a boolean, got `{other}`"
        ))),
    }
}

mod isolation_level {
    use quaint::connector::IsolationLevel;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &IsolationLevel, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(level)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IsolationLevel, D::Error> {
        let level = String::deserialize(deserializer)?;
        level.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: MutationSettings = serde_json::from_value(json!({ "logQueries": true })).unwrap();

        assert_eq!(settings.isolation_level, IsolationLevel::RepeatableRead);
        assert!(settings.defer_constraints);
        assert!(settings.log_queries);
    }

    #[test]
    fn isolation_levels_use_their_sql_spelling() {
        let settings: MutationSettings =
            serde_json::from_value(json!({ "isolationLevel": "SERIALIZABLE", "deferConstraints": false })).unwrap();

        assert_eq!(settings.isolation_level, IsolationLevel::Serializable);
        assert_eq!(
            serde_json::to_value(&settings).unwrap()["isolationLevel"],
            json!("SERIALIZABLE")
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let env = HashMap::from([
            (ISOLATION_LEVEL_VAR, "READ COMMITTED"),
            (DEFER_CONSTRAINTS_VAR, "0"),
            (LOG_QUERIES_VAR, "true"),
        ]);

        let settings = MutationSettings::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(settings.isolation_level, IsolationLevel::ReadCommitted);
        assert!(!settings.defer_constraints);
        assert!(settings.log_queries);
    }

    #[test]
    fn malformed_flags_are_rejected() {
        let err = MutationSettings::from_lookup(|name| (name == LOG_QUERIES_VAR).then(|| "maybe".to_owned()))
            .unwrap_err();

        assert_eq!(err.to_string(), "CONTENT_LOG_QUERIES: expected a boolean, got `maybe`");
    }
}
