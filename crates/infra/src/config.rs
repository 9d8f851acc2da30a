//! Configuration loading and representation.
//!
//! Values come from environment variables; every key has a default so a bare
//! process starts with a working in-memory setup.

use thiserror::Error;

use allocation_events::DEFAULT_CASCADE_LIMIT;

pub const CASCADE_LIMIT_VAR: &str = "ALLOCATION_CASCADE_LIMIT";
pub const NOTIFY_ADDRESS_VAR: &str = "ALLOCATION_NOTIFY_ADDRESS";

pub const DEFAULT_NOTIFY_ADDRESS: &str = "stock@made.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationConfig {
    /// Upper bound on messages one `handle` call may process.
    pub cascade_limit: usize,
    /// Where out-of-stock notifications are sent.
    pub notify_address: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            cascade_limit: DEFAULT_CASCADE_LIMIT,
            notify_address: DEFAULT_NOTIFY_ADDRESS.to_string(),
        }
    }
}

impl AllocationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (the environment, a map in tests, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cascade_limit = match lookup(CASCADE_LIMIT_VAR) {
            None => defaults.cascade_limit,
            Some(raw) => parse_cascade_limit(&raw)?,
        };

        let notify_address = match lookup(NOTIFY_ADDRESS_VAR) {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    key: NOTIFY_ADDRESS_VAR,
                    value: raw,
                    reason: "must not be empty".to_string(),
                });
            }
            Some(raw) => raw.trim().to_string(),
            None => {
                tracing::debug!("{NOTIFY_ADDRESS_VAR} not set; using {DEFAULT_NOTIFY_ADDRESS}");
                defaults.notify_address
            }
        };

        Ok(Self {
            cascade_limit,
            notify_address,
        })
    }
}

fn parse_cascade_limit(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: CASCADE_LIMIT_VAR,
        value: raw.to_string(),
        reason,
    };

    let limit: usize = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if limit == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AllocationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AllocationConfig::default());
        assert_eq!(config.notify_address, "stock@made.com");
    }

    #[test]
    fn reads_overrides() {
        let config = AllocationConfig::from_lookup(lookup(&[
            (CASCADE_LIMIT_VAR, "25"),
            (NOTIFY_ADDRESS_VAR, " buyers@example.com "),
        ]))
        .unwrap();

        assert_eq!(config.cascade_limit, 25);
        assert_eq!(config.notify_address, "buyers@example.com");
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(matches!(
            AllocationConfig::from_lookup(lookup(&[(CASCADE_LIMIT_VAR, "lots")])),
            Err(ConfigError::Invalid { key: CASCADE_LIMIT_VAR, .. })
        ));
        assert!(matches!(
            AllocationConfig::from_lookup(lookup(&[(CASCADE_LIMIT_VAR, "0")])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            AllocationConfig::from_lookup(lookup(&[(NOTIFY_ADDRESS_VAR, "  ")])),
            Err(ConfigError::Invalid { key: NOTIFY_ADDRESS_VAR, .. })
        ));
    }
}
