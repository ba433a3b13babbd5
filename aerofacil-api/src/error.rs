use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use aerofacil_core::CoreError;
use crate::middleware::login_redirect;
use crate::views::{Chrome, ErrorTemplate};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Forbidden,
    LoginRequired(String),
    Invalid(String),
    Conflict(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::LoginRequired(next) => return login_redirect(&next),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to do that.".to_string(),
            ),
            AppError::Invalid(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let page = ErrorTemplate {
            chrome: Chrome::sessionless(),
            status: status.as_u16(),
            message: error_message.clone(),
        };
        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, error_message).into_response(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => AppError::NotFound(what.to_string()),
            CoreError::Unauthenticated => AppError::LoginRequired("/".to_string()),
            CoreError::Forbidden => AppError::Forbidden,
            CoreError::Invalid(errors) => AppError::Invalid(errors.to_string()),
            CoreError::OwnTrip | CoreError::AlreadyRequested | CoreError::Conflict(_) => {
                AppError::Conflict(err.to_string())
            }
            CoreError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!("storage failure: {}", msg)),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Anyhow(anyhow::Error::new(err).context("template rendering failed"))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
