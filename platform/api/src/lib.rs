use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions};
use sea_orm::DbErr;
use thiserror::Error;

/// Shared service/GraphQL result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown in place of any internal failure.
pub const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Não autenticado")]
    Unauthorized,
    #[error("Permissão insuficiente")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Erro interno do servidor")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidInput(_) => "VALIDATION",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<DbErr> for ApiError {
    fn from(value: DbErr) -> Self {
        Self::internal(anyhow::Error::new(value))
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        if let ApiError::Internal(source) = self {
            tracing::error!(error = ?source, "internal error");
        }
        let code = self.code();
        Error::new(self.to_string()).extend_with(|_err, e| {
            e.set("code", code);
        })
    }
}

/// Convert any error into a GraphQL error payload while hiding internals.
pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
    ApiError::internal(err.into()).extend()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn code_of(err: &Error) -> Option<Value> {
        err.extensions
            .as_ref()
            .and_then(|map| map.get("code"))
            .cloned()
    }

    #[test]
    fn internal_errors_are_masked() {
        let err = internal_error(anyhow::anyhow!("boom"));
        assert_eq!(err.message, INTERNAL_MESSAGE);
        assert_eq!(code_of(&err), Some(Value::from("INTERNAL")));
    }

    #[test]
    fn database_errors_become_internal() {
        let err: ApiError = DbErr::Custom("connection reset".into()).into();
        assert_eq!(err.code(), "INTERNAL");
        assert_eq!(err.to_string(), INTERNAL_MESSAGE);
    }

    #[test]
    fn conflict_keeps_message_and_code() {
        let err = ApiError::conflict("Cadência já finalizada").extend();
        assert_eq!(err.message, "Cadência já finalizada");
        assert_eq!(code_of(&err), Some(Value::from("CONFLICT")));
    }

    #[test]
    fn invalid_input_reports_validation_code() {
        let err = ApiError::invalid("Nome obrigatório").extend();
        assert_eq!(code_of(&err), Some(Value::from("VALIDATION")));
    }
}
