// errors.rs
use crate::merge::AggregateError;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, aggregation).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Internal Server Error")]
    InternalError,
    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),
    #[error("Aggregation failed: {0}")]
    Aggregate(String),
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::DbError(_) | ServerError::InternalError | ServerError::XlsxError(_) => 500,
            ServerError::Aggregate(_) => 502,
            ServerError::Timeout(_) => 504,
        }
    }
}

impl From<AggregateError> for ServerError {
    fn from(err: AggregateError) -> Self {
        match &err {
            AggregateError::Timeout { .. } => ServerError::Timeout(err.to_string()),
            _ => ServerError::Aggregate(err.to_string()),
        }
    }
}
