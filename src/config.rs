use crate::error::ConfigError;
use std::time::Duration;

pub const FRED_API_KEY: &str = "FRED_API_KEY";
pub const CACHE_TTL_SECS: &str = "MACRO_DASHBOARD_CACHE_TTL_SECS";
pub const USER_AGENT: &str = "MACRO_DASHBOARD_USER_AGENT";

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_USER_AGENT: &str = "MacroDashboard/1.0";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fred_api_key: String,
    pub cache_ttl: Duration,
    pub user_agent: String,
}

impl AppConfig {
    /// Load from the process environment, after merging a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fred_api_key = lookup(FRED_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(FRED_API_KEY))?;

        let cache_ttl = match lookup(CACHE_TTL_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: CACHE_TTL_SECS,
                    message: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        };

        let user_agent = lookup(USER_AGENT).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self { fred_api_key, cache_ttl, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_key_aborts() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingCredential(FRED_API_KEY))));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let result = AppConfig::from_lookup(lookup_from(&[(FRED_API_KEY, "   ")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[(FRED_API_KEY, " abc ")])).unwrap();
        assert_eq!(config.fred_api_key, "abc");
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.user_agent, "MacroDashboard/1.0");
    }

    #[test]
    fn test_invalid_ttl() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (FRED_API_KEY, "abc"),
            (CACHE_TTL_SECS, "one hour"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: CACHE_TTL_SECS, .. })));
    }
}
