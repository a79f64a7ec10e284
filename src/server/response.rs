use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as StoreResult};

const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
const CONTENT_TYPE: &str = "Content-Type";

/// Result of a handler invocation: status, headers and a UTF-8 JSON body.
///
/// The body is empty only for a CORS preflight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HandlerResponse {
    #[must_use]
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_json_headers(status, body),
            Err(e) => {
                tracing::error!("Failed to encode response body: {e}");
                Self::with_json_headers(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }).to_string(),
                )
            }
        }
    }

    #[must_use]
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    #[must_use]
    pub fn created<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    /// Answer to an `OPTIONS` request listing the handler's verbs.
    #[must_use]
    pub fn preflight(allow_methods: &str) -> Self {
        let headers = BTreeMap::from([
            (ALLOW_ORIGIN.to_string(), "*".to_string()),
            (
                "Access-Control-Allow-Methods".to_string(),
                allow_methods.to_string(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                CONTENT_TYPE.to_string(),
            ),
            ("Access-Control-Max-Age".to_string(), "86400".to_string()),
        ]);
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: String::new(),
        }
    }

    fn with_json_headers(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            (CONTENT_TYPE.to_string(), "application/json".to_string()),
            (ALLOW_ORIGIN.to_string(), "*".to_string()),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        for (name, value) in self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header {name}"),
            }
        }
        response
    }
}

/// Handler error that converts to a JSON `{"error": ...}` response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "Method not allowed".to_string(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        HandlerResponse::json(err.status, &json!({ "error": err.message }))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        HandlerResponse::from(self).into_response()
    }
}

/// Extension trait for converting store results to API errors.
///
/// Store faults are logged with `context` and surface as a generic 500; the
/// underlying database error never reaches the client.
pub trait StoreResultExt<T> {
    fn api_err(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| store_error(e, context))
    }
}

pub fn store_error(err: Error, context: &str) -> ApiError {
    match err {
        Error::AlreadyExists => ApiError::conflict("Record already exists"),
        Error::UnknownReference => ApiError::bad_request("Referenced record does not exist"),
        Error::InvalidRole(role) => ApiError::bad_request(format!("Invalid role: {role}")),
        e => {
            tracing::error!("{context}: {e}");
            ApiError::internal("Internal server error")
        }
    }
}
