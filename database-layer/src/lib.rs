//! Persistence layer for WardCare
//!
//! This crate owns the persisted record types (wards, patients, transfers,
//! bills, payments, staff, forms) and the [`WardStore`] boundary every
//! service writes through.
//!
//! # Key Pieces
//!
//! - **Models**: entities plus the two pieces of arithmetic that must live in
//!   one place, [`Ward::with_bed_adjustment`] and [`Bill::with_payment_applied`]
//! - **Changes**: services describe writes as a [`ChangeSet`] of [`Mutation`]s
//!   and get back a [`StatePatch`] listing every entity that changed
//! - **Stores**: [`InMemoryStore`] for tests and demos, [`PgStore`] on PostgreSQL
//! - **Transactions**: [`TransactionManager`] applies a change set atomically
//!   or step by step, depending on the configured consistency mode
//!
//! # Example
//!
//! ```rust
//! use database_layer::{ChangeSet, InMemoryStore, TransactionManager, WardStore};
//! use config_engine::ConsistencyMode;
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! runtime.block_on(async {
//!     let store: Arc<dyn WardStore> = Arc::new(InMemoryStore::new());
//!     let manager = TransactionManager::new(store, ConsistencyMode::Transactional);
//!     let patch = manager.execute(ChangeSet::new("noop")).await?;
//!     assert!(patch.is_empty());
//!     Ok::<(), database_layer::DatabaseError>(())
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod changes;
pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;
pub mod transaction;

pub use changes::*;
pub use connection::*;
pub use error::*;
pub use memory::*;
pub use models::*;
pub use postgres::*;
pub use store::*;
pub use transaction::*;
