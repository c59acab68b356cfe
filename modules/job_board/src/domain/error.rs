use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("User already exists")]
    EmailAlreadyExists { email: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("User not found")]
    UserNotFound { id: Uuid },

    #[error("Company not found")]
    CompanyNotFound { id: Uuid },

    #[error("Job not found")]
    JobNotFound { id: Uuid },

    #[error("Application not found")]
    ApplicationNotFound { id: Uuid },

    #[error("Already applied to this job")]
    AlreadyApplied { job_id: Uuid },

    #[error("Job is no longer accepting applications")]
    JobClosed { job_id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn company_not_found(id: Uuid) -> Self {
        Self::CompanyNotFound { id }
    }

    pub fn job_not_found(id: Uuid) -> Self {
        Self::JobNotFound { id }
    }

    pub fn application_not_found(id: Uuid) -> Self {
        Self::ApplicationNotFound { id }
    }

    pub fn already_applied(job_id: Uuid) -> Self {
        Self::AlreadyApplied { job_id }
    }

    pub fn job_closed(job_id: Uuid) -> Self {
        Self::JobClosed { job_id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
