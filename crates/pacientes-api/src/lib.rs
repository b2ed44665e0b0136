//! HTTP response envelope and API error taxonomy.
//!
//! Every JSON endpoint answers with the same envelope:
//! `{"status": "success"|"error", "message"?, "paciente"?, "pacientes"?,
//! "filename"?, "error"?}`. Absent keys are omitted from the payload.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use pacientes_core::{CoreError, Paciente};
use pacientes_storage::StorageError;

/// The JSON response envelope shared by all record endpoints.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paciente: Option<Paciente>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacientes: Option<Vec<Paciente>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            status: "success",
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_paciente(mut self, paciente: Paciente) -> Self {
        self.paciente = Some(paciente);
        self
    }

    pub fn with_pacientes(mut self, pacientes: Vec<Paciente>) -> Self {
        self.pacientes = Some(pacientes);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

/// API error taxonomy, mapped onto HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/empty required field, disallowed file type, oversized file,
    /// or a missing file where one is required. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// No record or file matches the given identifier. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Storage or disk failure. HTTP 500, carrying the underlying detail.
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = match self {
            Self::Validation(message) | Self::NotFound(message) => Envelope::error(message),
            Self::Internal { message, detail } => {
                tracing::error!(error = %detail, "request failed");
                Envelope::error(message).with_error_detail(detail)
            }
        };
        (status, Json(envelope)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_client_error() {
            Self::Validation(err.to_string())
        } else {
            Self::internal("Error interno del servidor", err.to_string())
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            other => Self::internal("Error interno del servidor", other.to_string()),
        }
    }
}
