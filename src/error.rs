use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

use crate::services::market_data::MarketDataError;

/// Erreurs de l'application
///
/// Les variantes client (InvalidInput, Duplicate) remontent en 400.
/// Les autres ne sont normalement vues que par la tâche de refresh, qui les logue.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Stock not found: {0}")]
    NotFound(i32),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Malformed market data: {0}")]
    MalformedData(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MarketData(_) | AppError::MalformedData(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Le détail des erreurs serveur reste dans les logs
        let detail = if status.is_server_error() {
            log::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({ "detail": detail }))
    }
}
