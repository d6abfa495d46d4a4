use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::policies::Policies;
use crate::validation::validate;

/// Environment prefix; nested keys use a double underscore,
/// e.g. `WARDCARE_POLICIES__CAPACITY=allow_overflow`
pub const ENV_PREFIX: &str = "WARDCARE_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BillingSettings {
    pub bill_number_prefix: String,
    pub payment_number_prefix: String,
    pub default_due_days: u32,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            bill_number_prefix: "BILL".to_string(),
            payment_number_prefix: "PAY".to_string(),
            default_due_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string; unset means the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Complete WardCare configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WardCareConfig {
    pub policies: Policies,
    pub billing: BillingSettings,
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub logging: LoggerConfig,
}

/// Load configuration: defaults, then the optional file, then environment.
///
/// The file format follows the extension (`.toml`, otherwise YAML).
pub fn load(path: Option<&Path>) -> Result<WardCareConfig> {
    let mut figment = Figment::from(Serialized::defaults(WardCareConfig::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::ParseError(format!(
                "Configuration file {} does not exist",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Merging configuration file");
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            _ => figment.merge(Yaml::file(path)),
        };
    }

    let config: WardCareConfig = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
    validate(&config)?;

    info!(
        capacity = ?config.policies.capacity,
        overpayment = ?config.policies.overpayment,
        consistency = ?config.policies.consistency,
        persistent = config.database.url.is_some(),
        "Configuration loaded"
    );
    Ok(config)
}
