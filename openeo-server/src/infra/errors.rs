use std::any::Any;
use std::fmt;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use openeo_core::CoreError;
use openeo_model::{ErrorDocument, Link};
use tracing::{debug, error};
use uuid::Uuid;

pub type ApiResult<T> = Result<T, ApiError>;

const GENERIC_INTERNAL_MESSAGE: &str =
    "Server error: the request could not be completed. Please try again later.";

/// Headers attached to every error response. The underscore names are what
/// existing openEO clients look for; the standard names follow them.
const ERROR_CORS_HEADERS: [(&str, &str); 6] = [
    ("allow_origin", "*"),
    ("allow_credentials", "true"),
    ("allow_methods", "*"),
    ("access-control-allow-origin", "*"),
    ("access-control-allow-credentials", "true"),
    ("access-control-allow-methods", "*"),
];

/// A failure on its way to the client.
///
/// Converting into a response is the only place faults become HTTP: the
/// status is kept, the detail becomes an openEO error document, and the CORS
/// headers are always set. Server-side details are logged and replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub links: Vec<Link>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "MethodNotAllowed",
            "The HTTP method is not supported for this endpoint.",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub fn apply_error_cors_headers(headers: &mut HeaderMap) {
    for (name, value) in ERROR_CORS_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();

        let message = if self.status.is_server_error() {
            error!(
                %error_id,
                status = self.status.as_u16(),
                code = %self.code,
                "request failed: {}",
                self.message
            );
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            debug!(
                %error_id,
                status = self.status.as_u16(),
                code = %self.code,
                "request rejected: {}",
                self.message
            );
            self.message
        };

        let body = ErrorDocument {
            id: Some(error_id),
            code: self.code,
            message,
            links: self.links,
        };

        let mut response = (self.status, Json(body)).into_response();
        apply_error_cors_headers(response.headers_mut());
        response
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = err.code();
        match err {
            CoreError::Validation { message, .. } => {
                Self::new(StatusCode::BAD_REQUEST, code, message)
            }
            CoreError::Unauthorized { message, .. } => {
                Self::new(StatusCode::UNAUTHORIZED, code, message)
            }
            CoreError::Forbidden { message, .. } => {
                Self::new(StatusCode::FORBIDDEN, code, message)
            }
            CoreError::NotFound { message, .. } => {
                Self::new(StatusCode::NOT_FOUND, code, message)
            }
            CoreError::Conflict { message, .. } => {
                Self::new(StatusCode::CONFLICT, code, message)
            }
            CoreError::Internal(detail) => Self::internal(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "ContentTypeInvalid",
            _ => "BadRequest",
        };
        let status = match &rejection {
            JsonRejection::BytesRejection(_) => rejection.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, code, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", rejection.body_text())
    }
}

/// Response for a handler that panicked; used with `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_status_class() {
        let cases = [
            (CoreError::process_graph_missing(), StatusCode::BAD_REQUEST),
            (CoreError::token_invalid(), StatusCode::UNAUTHORIZED),
            (CoreError::forbidden("no"), StatusCode::FORBIDDEN),
            (CoreError::collection_not_found("S2"), StatusCode::NOT_FOUND),
            (CoreError::conflict("taken"), StatusCode::CONFLICT),
            (CoreError::internal("db down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (core, status) in cases {
            let code = core.code();
            let api = ApiError::from(core);
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn every_error_response_carries_cors_headers() {
        let response = ApiError::not_found("nothing here").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        for (name, value) in ERROR_CORS_HEADERS {
            assert_eq!(response.headers()[name], value, "{name}");
        }
    }

    #[test]
    fn panic_payload_becomes_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
