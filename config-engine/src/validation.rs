// Semantic checks applied after the configuration is extracted
use crate::error::{ConfigError, Result};
use crate::settings::WardCareConfig;

/// Longest payment term accepted for new bills
pub const MAX_DUE_DAYS: u32 = 365;

pub fn validate(config: &WardCareConfig) -> Result<()> {
    let mut problems = Vec::new();

    if config.billing.bill_number_prefix.trim().is_empty() {
        problems.push("billing.bill_number_prefix must not be empty".to_string());
    }
    if config.billing.payment_number_prefix.trim().is_empty() {
        problems.push("billing.payment_number_prefix must not be empty".to_string());
    }
    if config.billing.default_due_days > MAX_DUE_DAYS {
        problems.push(format!(
            "billing.default_due_days must be at most {MAX_DUE_DAYS}, got {}",
            config.billing.default_due_days
        ));
    }
    if config.database.max_connections == 0 {
        problems.push("database.max_connections must be greater than zero".to_string());
    }
    if let Some(url) = &config.database.url {
        if url.trim().is_empty() {
            problems.push("database.url must not be blank when set".to_string());
        }
    }
    if config.logging.log_level.trim().is_empty() {
        problems.push("logging.log_level must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(problems.join("; ")))
    }
}
