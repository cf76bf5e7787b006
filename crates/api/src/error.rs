use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coral_auth::AuthError;
use coral_database::DatabaseError;
use coral_tenant::TenantError;
use serde_json::json;

/// Wire-level error: a status code and a client-safe message. Everything a
/// client sees goes through here; internals stay in the logs.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "statusCode": self.status.as_u16(),
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // one indistinguishable rejection for every identity failure, so
            // responses cannot be used to enumerate emails or tenants
            AuthError::WrongCredentials
            | AuthError::TenantNotFound
            | AuthError::PrimaryDirectoryMiss => {
                tracing::warn!(reason = %err, "sign-in rejected");
                Self::bad_request("Wrong credentials provided")
            }
            AuthError::NoRolesAssigned => Self::bad_request(err.to_string()),
            AuthError::Validation(e) => Self::bad_request(e.to_string()),
            AuthError::Database(e) => Self::from(e),
            AuthError::Jwt(e) => {
                tracing::error!(error = %e, "token signing failed");
                Self::internal()
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidIdentifier(m) | DatabaseError::InvalidInput(m) => {
                Self::bad_request(m)
            }
            DatabaseError::ConnectionFailed(m) => {
                tracing::error!(error = %m, "database unreachable");
                Self::internal()
            }
            DatabaseError::Query(m) => {
                tracing::error!(error = %m, "query failed");
                Self::internal()
            }
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::PrimaryDirectoryMiss => {
                tracing::warn!("tenant mapping missing");
                Self::bad_request("Wrong credentials provided")
            }
            TenantError::Database(e) => Self::from(e),
        }
    }
}
