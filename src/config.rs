//! Register configuration, read from a TOML file.
//!
//! ```toml
//! store_name = "Grocery Store"
//! data_dir = "/var/lib/register"
//! persist = true
//! channel_buffer = 32
//! receipt_dir = "/var/lib/register/receipts"
//!
//! [reports]
//! low_stock_threshold = 10
//! top_products = 5
//!
//! [[accounts]]
//! username = "admin"
//! password = "password"
//! name = "Admin"
//! role = "admin"
//! ```

use std::path::{Path, PathBuf};
use serde::Deserialize;
use thiserror::Error;
use crate::reports::{ReportOptions, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TOP_PRODUCTS};
use crate::session::Role;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterConfig {
    /// Printed at the top of every receipt.
    pub store_name: String,
    pub data_dir: Option<PathBuf>,
    /// When false, collections live only in memory.
    pub persist: bool,
    pub channel_buffer: usize,
    /// Receipts are written here when set, otherwise printed to stdout.
    pub receipt_dir: Option<PathBuf>,
    pub reports: ReportsConfig,
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsConfig {
    pub low_stock_threshold: u32,
    pub top_products: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            store_name: "Grocery Store".to_string(),
            data_dir: None,
            persist: true,
            channel_buffer: 32,
            receipt_dir: None,
            reports: ReportsConfig::default(),
            accounts: vec![
                Account {
                    username: "admin".to_string(),
                    password: "password".to_string(),
                    name: "Admin".to_string(),
                    role: Role::Admin,
                },
                Account {
                    username: "cashier".to_string(),
                    password: "password".to_string(),
                    name: "Cashier".to_string(),
                    role: Role::Cashier,
                },
            ],
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            top_products: DEFAULT_TOP_PRODUCTS,
        }
    }
}

impl From<ReportsConfig> for ReportOptions {
    fn from(config: ReportsConfig) -> Self {
        ReportOptions {
            top_products: config.top_products,
            low_stock_threshold: config.low_stock_threshold,
        }
    }
}

impl RegisterConfig {
    /// Loads `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text).map_err(|e| match e {
                    ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.to_path_buf(), source },
                    other => other,
                })?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: RegisterConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_buffer == 0 {
            return Err(ConfigError::Invalid("channel_buffer must be at least 1".to_string()));
        }
        if self.accounts.is_empty() {
            return Err(ConfigError::Invalid("at least one account is required".to_string()));
        }
        Ok(())
    }

    /// Directory for collection snapshots and the checkout journal, or
    /// `None` when running in memory.
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }
        Some(self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join("register"))
                .unwrap_or_else(|| PathBuf::from(".register"))
        }))
    }

    pub fn report_options(&self) -> ReportOptions {
        self.reports.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_accounts() {
        let config = RegisterConfig::default();
        assert_eq!(config.store_name, "Grocery Store");
        assert_eq!(config.reports.low_stock_threshold, 10);
        assert_eq!(config.reports.top_products, 5);
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[1].role, Role::Cashier);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegisterConfig::from_toml(
            r#"
            store_name = "Corner Shop"
            persist = false

            [reports]
            low_stock_threshold = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.reports.low_stock_threshold, 3);
        assert_eq!(config.reports.top_products, 5);
        assert!(config.resolved_data_dir().is_none());
        assert_eq!(config.accounts.len(), 2);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(RegisterConfig::from_toml("colour = \"red\""), Err(ConfigError::Parse { .. })));
        assert!(matches!(RegisterConfig::from_toml("channel_buffer = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(RegisterConfig::from_toml("accounts = []"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("register.toml");
        std::fs::write(
            &path,
            r#"
            data_dir = "/tmp/register-data"

            [[accounts]]
            username = "sam"
            password = "secret"
            name = "Sam"
            role = "cashier"
            "#,
        )
        .unwrap();
        let config = RegisterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.resolved_data_dir(), Some(PathBuf::from("/tmp/register-data")));
        assert_eq!(config.accounts[0].username, "sam");

        let missing = RegisterConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
