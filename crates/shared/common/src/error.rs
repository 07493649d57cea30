//! Unified error handling for the portal services.
//!
//! Provides a single error type with a stable machine code and a
//! user-facing message for the presentation layer's alerts.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("El usuario ya existe")]
    DuplicateUsername(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // Storage backend
    #[error("Storage error")]
    Io(#[from] std::io::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::DuplicateUsername(_) => "DUPLICATE_USERNAME",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Io(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidCredentials => domain::INVALID_CREDENTIALS_REASON.to_string(),

            // Hide details for storage/internal errors
            AppError::Io(e) => {
                tracing::error!("Storage error: {:?}", e);
                "No se pudo acceder al almacenamiento".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Los datos almacenados no son válidos".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Ocurrió un error interno".to_string()
            }

            _ => self.to_string(),
        }
    }

    /// Whether the failure is the caller's doing rather than the system's
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::Io(_) | AppError::Serialization(_) | AppError::Internal(_)
        )
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::DuplicateUsername(name) => AppError::DuplicateUsername(name),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn duplicate_username(username: impl Into<String>) -> Self {
        AppError::DuplicateUsername(username.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_conversion() {
        let err: AppError = DomainError::DuplicateUsername("admin".into()).into();
        assert!(matches!(err, AppError::DuplicateUsername(ref n) if n == "admin"));
        assert_eq!(err.code(), "DUPLICATE_USERNAME");
        assert_eq!(err.user_message(), "El usuario ya existe");

        let err: AppError = DomainError::password("Password must not be empty").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(
            AppError::InvalidCredentials.user_message(),
            "Credenciales inválidas"
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("disk on fire");
        assert!(!err.user_message().contains("disk"));
        assert!(!err.is_client_error());
        assert!(AppError::NotFound.is_client_error());
    }

    #[test]
    fn test_caller_mistakes_are_client_errors() {
        assert!(AppError::InvalidCredentials.is_client_error());
        assert!(AppError::duplicate_username("admin").is_client_error());
        assert!(AppError::validation("vacío").is_client_error());

        let bad_json = serde_json::from_str::<u32>("x").unwrap_err();
        assert!(!AppError::from(bad_json).is_client_error());
    }

    #[test]
    fn test_option_ext() {
        assert!(matches!(None::<u8>.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
