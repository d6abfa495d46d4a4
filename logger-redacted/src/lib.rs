//! Logging for WardCare with patient PII redaction
//!
//! Ward and billing records carry free text that identifies patients
//! (names, emergency contacts, payment notes). Services log entity ids
//! through structured `tracing` fields and pass any free text through
//! [`PiiRedactor`] first, either directly or via the `redacted_info!` macro.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: ravi@example.com → r***@e***
//! - **Phone Numbers**: +91 98765 43210 → [PHONE]
//! - **Card Numbers**: 4111 1111 1111 1234 → ****-****-****-1234
//! - **Sensitive Fields**: name, emergency_contact, notes → hashed for correlation
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{init_logging, LoggerConfig, PiiRedactor};
//!
//! init_logging(&LoggerConfig::default()).ok();
//! let redactor = PiiRedactor::default();
//! logger_redacted::redacted_info!(redactor, "Contact updated to {}", "+91 98765 43210");
//! ```

pub mod redactor;
pub mod macros;
pub mod config;

pub use redactor::*;
pub use config::*;

use error_common::{Result, WardCareError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice returns
/// an error instead of panicking, so tests can call it freely.
pub fn init_logging(config: &LoggerConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_directive()))
        .map_err(|e| WardCareError::ConfigError(format!("Invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };

    result.map_err(|e| WardCareError::InternalError(format!("Logger already initialized: {e}")))
}

/// Build the redactor matching the logging configuration
pub fn redactor_for(config: &LoggerConfig) -> PiiRedactor {
    if config.redaction_enabled {
        PiiRedactor::default()
    } else {
        PiiRedactor::new(RedactionConfig::disabled())
    }
}
