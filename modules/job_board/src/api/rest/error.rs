use api_ingress::AppError;

use crate::domain::error::DomainError;

/// Map a domain error to the HTTP error body
pub fn map_domain_error(e: DomainError) -> AppError {
    match e {
        DomainError::Validation { field, message } => AppError::invalid_field(field, message),
        DomainError::InvalidCredentials | DomainError::MissingToken | DomainError::InvalidToken => {
            AppError::Unauthorized(e.to_string())
        }
        DomainError::Forbidden { message } => AppError::Forbidden(message),
        DomainError::UserNotFound { .. }
        | DomainError::CompanyNotFound { .. }
        | DomainError::JobNotFound { .. }
        | DomainError::ApplicationNotFound { .. } => AppError::NotFound(e.to_string()),
        DomainError::EmailAlreadyExists { .. }
        | DomainError::AlreadyApplied { .. }
        | DomainError::JobClosed { .. } => AppError::Conflict(e.to_string()),
        // Details are logged by AppError, never sent to the client
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            AppError::Internal(anyhow::Error::new(e))
        }
    }
}
