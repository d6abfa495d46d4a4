//! Layered configuration for WardCare
//!
//! Configuration is assembled from built-in defaults, an optional YAML or
//! TOML file and `WARDCARE_`-prefixed environment variables, in that order
//! of precedence. Besides the usual server, database and logging sections
//! it carries the named [`Policies`] that decide behavior the ward
//! workflow leaves open: overflow admission, overpayment handling and
//! whether multi-entity writes commit atomically.
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{load, ConsistencyMode};
//!
//! let config = load(Some(std::path::Path::new("wardcare.yaml")))?;
//! if config.policies.consistency == ConsistencyMode::BestEffort {
//!     println!("writes are not atomic");
//! }
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod error;
pub mod policies;
pub mod settings;
pub mod validation;

pub use error::*;
pub use policies::*;
pub use settings::*;
