use error_common::{Classify, ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use crate::changes::StatePatch;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Sequence {0} unavailable")]
    SequenceUnavailable(&'static str),

    #[error("Could not decode stored value: {0}")]
    Decode(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Some writes of a multi-step operation landed, the rest did not
    #[error("{operation} applied {applied} of {total} writes before failing: {source}")]
    PartialApplication {
        operation: String,
        applied: usize,
        total: usize,
        patch: Box<StatePatch>,
        source: Box<DatabaseError>,
    },

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        DatabaseError::NotFound { entity, id }
    }

    /// Writes that did reach the store when a multi-step operation failed
    pub fn partial_patch(&self) -> Option<&StatePatch> {
        match self {
            DatabaseError::PartialApplication { patch, .. } => Some(patch),
            _ => None,
        }
    }
}

impl Classify for DatabaseError {
    fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::NotFound { .. } => ErrorKind::NotFound,
            DatabaseError::PartialApplication { .. } => ErrorKind::PartialApplication,
            _ => ErrorKind::RemotePersistenceFailure,
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
