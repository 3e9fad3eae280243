//! The single error kind of the gate: access denied.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::config::RejectionFormat;

/// A terminal 403 produced by one of the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    filter: &'static str,
    message: String,
    format: RejectionFormat,
}

impl Rejection {
    pub fn new(filter: &'static str, message: impl Into<String>) -> Self {
        Self {
            filter,
            message: message.into(),
            format: RejectionFormat::Text,
        }
    }

    /// Render the body in the given format.
    pub fn with_format(mut self, format: RejectionFormat) -> Self {
        self.format = format;
        self
    }

    /// Name of the filter that rejected the request.
    pub fn filter(&self) -> &'static str {
        self.filter
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self.format {
            RejectionFormat::Text => (
                StatusCode::FORBIDDEN,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.message,
            )
                .into_response(),
            RejectionFormat::Json => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": self.message })),
            )
                .into_response(),
        }
    }
}
