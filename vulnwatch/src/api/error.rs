use std::fmt::Display;

use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

#[derive(Debug)]
pub enum ApplicationError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
    ServiceUnavailable,
}

/// Every error leaves the API as a JSON body with a human-readable
/// `message`; store failures also carry the driver error text under `error`.
/// Queries and credentials never appear in a response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl actix_web::error::ResponseError for ApplicationError {
    fn error_response(&self) -> HttpResponse {
        let mut b = HttpResponseBuilder::new(self.status_code());

        match self {
            Self::BadRequest(message) | Self::NotFound(message) => b.json(ErrorBody {
                message,
                error: None,
            }),
            Self::InternalServerError(error) => b.json(ErrorBody {
                message: "Error executing query",
                error: Some(error),
            }),
            Self::ServiceUnavailable => b.json(ErrorBody {
                message: "Service unavailable",
                error: None,
            }),
        }
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

pub fn handle_blocking_error(error: BlockingError) -> ApplicationError {
    log::error!("{}", error);
    ApplicationError::ServiceUnavailable
}

pub fn internal_server_error(error: anyhow::Error) -> ApplicationError {
    log::error!("{}", error);
    ApplicationError::InternalServerError(error.to_string())
}

#[cfg(test)]
mod tests {
    use actix_web::error::ResponseError;

    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(
            ApplicationError::BadRequest("CVE ID is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApplicationError::NotFound("CVE not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApplicationError::InternalServerError("connection reset".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_failures_expose_the_driver_error_text() {
        let body = serde_json::to_value(ErrorBody {
            message: "Error executing query",
            error: Some("connection reset"),
        })
        .unwrap();

        assert_eq!(body["message"], "Error executing query");
        assert_eq!(body["error"], "connection reset");
    }

    #[test]
    fn client_errors_omit_the_error_field() {
        let body = serde_json::to_value(ErrorBody {
            message: "CVE not found",
            error: None,
        })
        .unwrap();

        assert!(body.get("error").is_none());
    }
}
