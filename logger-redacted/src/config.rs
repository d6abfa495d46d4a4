// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    pub redaction_enabled: bool,
    pub json: bool,
    pub log_level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            json: false,
            log_level: "info".to_string(),
        }
    }
}

impl LoggerConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        format!(
            "{level},ward_server={level},ward_service={level},billing_service={level},database_layer={level},tower_http=info,sqlx=warn",
            level = self.log_level
        )
    }
}
