use sqlx::error::DatabaseError as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,

    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl DatabaseError {
    /// Map unique-constraint conflicts to `Duplicate` so callers can
    /// translate them (e.g. enrollment create-or-reactivate).
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::Duplicate;
            }
        }
        DatabaseError::Sqlx(err)
    }
}
