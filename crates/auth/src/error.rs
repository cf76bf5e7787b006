use coral_database::DatabaseError;
use coral_tenant::TenantError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password collapse into this one variant so
    /// responses cannot be used to probe which emails exist.
    #[error("Wrong credentials provided")]
    WrongCredentials,

    #[error("No roles assigned. Please contact Admin.")]
    NoRolesAssigned,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("No tenant mapping found for this user")]
    PrimaryDirectoryMiss,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<TenantError> for AuthError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::PrimaryDirectoryMiss => Self::PrimaryDirectoryMiss,
            TenantError::Database(e) => Self::Database(e),
        }
    }
}
