use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose outside the module
#[derive(Error, Debug, Clone)]
pub enum MembersError {
    #[error("Member not found: {id}")]
    NotFound { id: Uuid },

    #[error("A member with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl MembersError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(email: String) -> Self {
        Self::Conflict { email }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for MembersError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError;
        match e {
            DomainError::MemberNotFound { id } => Self::not_found(id),
            DomainError::EmailAlreadyExists { email } => Self::conflict(email),
            DomainError::InvalidEmail { email } => {
                Self::validation(format!("Invalid email: {email}"))
            }
            DomainError::EmptyName => Self::validation("Name is required."),
            DomainError::NameTooLong { len, max } => {
                Self::validation(format!("Name too long: {len} characters (max: {max})"))
            }
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::Database { .. } => Self::internal(),
        }
    }
}
