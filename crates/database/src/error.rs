use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Tenant database unreachable or credentials rejected. Terminal for the
    /// operation; retries are the caller's decision.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<bson::de::Error> for DatabaseError {
    fn from(err: bson::de::Error) -> Self {
        Self::Query(err.to_string())
    }
}
