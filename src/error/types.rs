use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ParseResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Password is required")]
    MissingPassword,

    #[error("PDF file is required")]
    MissingFile,

    #[error("{message}")]
    InvalidFile { message: String },

    #[error("Invalid multipart request: {message}")]
    InvalidMultipart { message: String },

    #[error("Upload exceeds limit of {limit}MB")]
    FileTooLarge { limit: usize },

    #[error("{message}")]
    TempFile { message: String },

    #[error("Failed to process PDF: {message}")]
    ProcessingError { message: String },

    #[error("Failed to process PDF: {message}")]
    Decryption { message: String },

    #[error("Failed to process PDF: completion request failed: {message}")]
    Completion { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingPassword => "MISSING_PASSWORD",
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::InvalidMultipart { .. } => "INVALID_MULTIPART",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::TempFile { .. } => "TEMP_FILE_ERROR",
            AppError::ProcessingError { .. } => "PROCESSING_ERROR",
            AppError::Decryption { .. } => "DECRYPTION_ERROR",
            AppError::Completion { .. } => "COMPLETION_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingPassword => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidMultipart { .. } => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TempFile { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ProcessingError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Decryption { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Completion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let error_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                error_id = %error_id,
                error_message = %message,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                error_id = %error_id,
                error_message = %message,
                "Request rejected"
            );
        }

        (status, Json(ParseResponse::failure(message))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("PDF worker task failed: {}", err),
        }
    }
}

impl AppError {
    pub fn invalid_file(message: impl Into<String>) -> Self {
        AppError::InvalidFile {
            message: message.into(),
        }
    }

    pub fn temp_file(message: impl Into<String>) -> Self {
        AppError::TempFile {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        AppError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn decryption(message: impl Into<String>) -> Self {
        AppError::Decryption {
            message: message.into(),
        }
    }

    pub fn completion(message: impl Into<String>) -> Self {
        AppError::Completion {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
