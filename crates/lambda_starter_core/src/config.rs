//! Typed access to environment-derived configuration.
//!
//! Every getter comes in three flavours: optional (`Option`), with a default,
//! and required (fails with [`ConfigError::Missing`]). An empty value counts as
//! unset.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable is not set: {key}")]
    Missing { key: String },

    #[error("environment variable {key} is not a valid {expected}: {value}")]
    Invalid {
        key: String,
        expected: &'static str,
        value: String,
    },
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Source of configuration values.
pub struct Env {
    lookup: Lookup,
}

impl Env {
    /// Reads from the process environment.
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Reads from a fixed set of pairs; nothing else is visible.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            lookup: Box::new(move |key: &str| values.get(key).cloned()),
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.is_empty())
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn require_string(&self, key: &str) -> Result<String, ConfigError> {
        self.string(key).ok_or_else(|| missing(key))
    }

    pub fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.string(key)
            .map(|raw| {
                let parsed = raw.trim().parse::<T>();
                parsed.map_err(|_| invalid(key, "number", raw))
            })
            .transpose()
    }

    pub fn number_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.number(key)?.unwrap_or(default))
    }

    pub fn require_number<T: FromStr>(&self, key: &str) -> Result<T, ConfigError> {
        self.number(key)?.ok_or_else(|| missing(key))
    }

    /// `true`, `1` and `yes` (any case) are true; any other set value is false.
    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.string(key).map(|raw| {
            matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            )
        })
    }

    pub fn boolean_or(&self, key: &str, default: bool) -> bool {
        self.boolean(key).unwrap_or(default)
    }

    pub fn require_boolean(&self, key: &str) -> Result<bool, ConfigError> {
        self.boolean(key).ok_or_else(|| missing(key))
    }

    pub fn json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.string(key)
            .map(|raw| {
                let parsed = serde_json::from_str::<T>(&raw);
                parsed.map_err(|_| invalid(key, "JSON value", raw))
            })
            .transpose()
    }

    pub fn json_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.json(key)?.unwrap_or(default))
    }

    pub fn require_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.json(key)?.ok_or_else(|| missing(key))
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::Missing {
        key: key.to_string(),
    }
}

fn invalid(key: &str, expected: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        expected,
        value,
    }
}
