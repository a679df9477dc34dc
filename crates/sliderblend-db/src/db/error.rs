use sqlx::error::ErrorKind;

/// Failure of a relational operation.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return PersistenceError::Constraint(db_err.message().to_string());
                }
                _ => {}
            }
        }
        PersistenceError::Database(err)
    }
}
