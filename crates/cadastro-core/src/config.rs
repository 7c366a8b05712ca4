//! Configuration types for the cadastro system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main cadastro configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadastroConfig {
    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Address lookup configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Service behavior configuration
    #[serde(default)]
    pub service: ServiceConfig,
}

impl CadastroConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            store: StoreConfig::default(),
            lookup: LookupConfig::default(),
            service: ServiceConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.lookup.validate()?;
        Ok(())
    }
}

impl Default for CadastroConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Record store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// File-based record store
    File {
        /// Path to the store file
        path: String,
    },

    /// In-memory record store (not persistent)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("store file path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Memory => Ok(()),
        }
    }
}

/// Address lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the lookup service
    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,

    /// Bounded per-request timeout, in seconds
    ///
    /// A blocked lookup blocks the calling operation for at most this
    /// long; there is no retry and no background re-issue.
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl LookupConfig {
    /// Validate the lookup configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("lookup base URL cannot be empty"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "lookup base URL must use HTTP or HTTPS. Got: {}",
                self.base_url
            )));
        }
        if !(1..=60).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "lookup timeout must be between 1 and 60 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

/// Behavior of create when the address lookup fails with
/// not-found/unavailable (a malformed code is always a validation error)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateFallbackPolicy {
    /// Keep the record and store a failure placeholder address line
    #[default]
    Placeholder,
    /// Fail the whole create
    Abort,
}

/// Service behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// What create does when the lookup fails
    #[serde(default)]
    pub create_fallback: CreateFallbackPolicy,

    /// Directory export artifacts are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            create_fallback: CreateFallbackPolicy::default(),
            export_dir: default_export_dir(),
        }
    }
}

fn default_lookup_base_url() -> String {
    "https://viacep.com.br/ws".to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    5
}

fn default_export_dir() -> String {
    ".".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CadastroConfig::default().validate().is_ok());
    }

    #[test]
    fn file_store_requires_a_path() {
        let config = StoreConfig::File {
            path: String::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn lookup_url_scheme_is_checked() {
        let config = LookupConfig {
            base_url: "ftp://viacep.com.br/ws".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn lookup_timeout_bounds_are_checked() {
        let config = LookupConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fallback_policy_defaults_to_placeholder() {
        assert_eq!(
            ServiceConfig::default().create_fallback,
            CreateFallbackPolicy::Placeholder
        );
    }
}
