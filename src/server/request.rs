use std::collections::HashMap;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::server::response::ApiError;
use crate::server::validation::validate_id;

/// An HTTP-style invocation of a resource handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl HandlerRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    /// Query parameter value; empty strings count as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn query_id(&self, name: &str) -> Result<Option<i64>, ApiError> {
        self.query_param(name)
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ApiError::bad_request(format!("{name} must be an integer")))
                    .and_then(|id| validate_id(name, id))
            })
            .transpose()
    }

    pub fn require_query_id(&self, name: &str) -> Result<i64, ApiError> {
        self.query_id(name)?
            .ok_or_else(|| ApiError::bad_request(format!("{name} required")))
    }

    /// Parses the body as a JSON object. A missing or blank body is `{}`.
    pub fn json_object(&self) -> Result<Map<String, Value>, ApiError> {
        let raw = self.body.as_deref().map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
            Err(_) => Err(ApiError::bad_request("Invalid JSON body")),
        }
    }
}

/// Reads the `action` discriminator from the body, falling back to the query.
pub fn body_action(req: &HandlerRequest, body: &Map<String, Value>) -> Option<String> {
    body.get("action")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| req.query_param("action").map(str::to_string))
}

/// A request DTO read field by field from a JSON object body.
pub trait FromBody: Sized {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError>;
}

/// Converts a parsed body into a typed request DTO.
pub fn parse_body<T: FromBody>(body: Map<String, Value>) -> Result<T, ApiError> {
    T::from_body(&body)
}

fn body_field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|v| !v.is_null())
}

/// Integer body field; `null` counts as absent.
pub fn body_i64(body: &Map<String, Value>, name: &str) -> Result<Option<i64>, ApiError> {
    body_field(body, name)
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| ApiError::bad_request(format!("{name} must be an integer")))
        })
        .transpose()
}

pub fn body_string(body: &Map<String, Value>, name: &str) -> Result<Option<String>, ApiError> {
    body_field(body, name)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::bad_request(format!("{name} must be a string")))
        })
        .transpose()
}

pub fn body_bool(body: &Map<String, Value>, name: &str) -> Result<Option<bool>, ApiError> {
    body_field(body, name)
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| ApiError::bad_request(format!("{name} must be a boolean")))
        })
        .transpose()
}
