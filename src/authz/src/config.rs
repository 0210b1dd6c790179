//! Resolver configuration loading
//!
//! Configuration comes from a TOML file, with environment overrides:
//!
//! - `KEYWARD_MEMBERSHIP_CACHE_SIZE` - user membership cache capacity
//! - `KEYWARD_PERMISSION_CACHE_SIZE` - role permission cache capacity
//! - `KEYWARD_WARMUP_ON_START` - run warmup when the service starts (`true`/`false`)
//!
//! ```toml
//! membership_cache_size = 5000
//! permission_cache_size = 500
//! warmup_on_start = true
//! known_permissions = ["user:create", "user:delete"]
//! ```

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_MEMBERSHIP_CACHE_SIZE: &str = "KEYWARD_MEMBERSHIP_CACHE_SIZE";
pub const ENV_PERMISSION_CACHE_SIZE: &str = "KEYWARD_PERMISSION_CACHE_SIZE";
pub const ENV_WARMUP_ON_START: &str = "KEYWARD_WARMUP_ON_START";

/// Authorization resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Maximum cached user membership entries
    #[serde(default = "default_membership_cache_size")]
    pub membership_cache_size: usize,

    /// Maximum cached role permission entries
    #[serde(default = "default_permission_cache_size")]
    pub permission_cache_size: usize,

    /// Warm caches before serving requests
    #[serde(default = "default_true")]
    pub warmup_on_start: bool,

    /// Permission names the service relies on; created during warmup if missing
    #[serde(default)]
    pub known_permissions: Vec<String>,
}

fn default_membership_cache_size() -> usize {
    10_000
}

fn default_permission_cache_size() -> usize {
    1_000
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            membership_cache_size: default_membership_cache_size(),
            permission_cache_size: default_permission_cache_size(),
            warmup_on_start: true,
            known_permissions: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AuthzError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_MEMBERSHIP_CACHE_SIZE) {
            self.membership_cache_size = parse_var(ENV_MEMBERSHIP_CACHE_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_PERMISSION_CACHE_SIZE) {
            self.permission_cache_size = parse_var(ENV_PERMISSION_CACHE_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_WARMUP_ON_START) {
            self.warmup_on_start = parse_var(ENV_WARMUP_ON_START, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the resolver cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.membership_cache_size == 0 {
            return Err(AuthzError::Config(
                "membership_cache_size must be at least 1".to_string(),
            ));
        }
        if self.permission_cache_size == 0 {
            return Err(AuthzError::Config(
                "permission_cache_size must be at least 1".to_string(),
            ));
        }
        if let Some(empty) = self.known_permissions.iter().position(|p| p.trim().is_empty()) {
            return Err(AuthzError::Config(format!(
                "known_permissions[{}] is empty",
                empty
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AuthzError::Config(format!("{}='{}': {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.membership_cache_size, 10_000);
        assert_eq!(config.permission_cache_size, 1_000);
        assert!(config.warmup_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ResolverConfig::from_toml_str(
            r#"
            permission_cache_size = 64
            known_permissions = ["user:create"]
            "#,
        )
        .unwrap();

        assert_eq!(config.permission_cache_size, 64);
        assert_eq!(config.membership_cache_size, 10_000);
        assert_eq!(config.known_permissions, vec!["user:create"]);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = ResolverConfig::from_toml_str("membership_cache_size = 0").unwrap_err();
        assert!(matches!(err, AuthzError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_MEMBERSHIP_CACHE_SIZE, "42"),
            (ENV_WARMUP_ON_START, "false"),
        ]
        .into_iter()
        .collect();

        let config = ResolverConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.membership_cache_size, 42);
        assert_eq!(config.permission_cache_size, 1_000);
        assert!(!config.warmup_on_start);
    }

    #[test]
    fn test_bad_env_value() {
        let err = ResolverConfig::default()
            .with_overrides(|key| (key == ENV_PERMISSION_CACHE_SIZE).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PERMISSION_CACHE_SIZE));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warmup_on_start = false").unwrap();

        let config = ResolverConfig::from_file(file.path()).unwrap();
        assert!(!config.warmup_on_start);
    }

    #[test]
    fn test_missing_file() {
        let err = ResolverConfig::from_file("/nonexistent/keyward.toml").unwrap_err();
        assert!(matches!(err, AuthzError::Io(_)));
    }
}
