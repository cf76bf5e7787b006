use coral_database::DatabaseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TenantError>;

#[derive(Debug, Error)]
pub enum TenantError {
    /// Primary-directory routing found no tenant mapping for the user's
    /// email. Deliberately carries no email; callers decide what to reveal.
    #[error("No tenant mapping found for this user")]
    PrimaryDirectoryMiss,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
