use thiserror::Error;

/// Core error types for record validation and domain operations.
///
/// Every variant describes a rejected client value; the messages are the
/// user-facing Spanish strings the endpoints answer with.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("El campo \"{0}\" es obligatorio y no puede estar vacío.")]
    MissingField(String),

    #[error("El campo \"{field}\" no es válido: {message}")]
    InvalidField { field: String, message: String },

    #[error("Fecha inválida: {0}")]
    InvalidDate(String),
}

impl CoreError {
    /// Create a new MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a new InvalidField error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidDate error
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::InvalidField { .. } | Self::InvalidDate(_)
        )
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
