use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
}

impl EngineError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        EngineError::NotFound(format!("{} {}", entity, id))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
