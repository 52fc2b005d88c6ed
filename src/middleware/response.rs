use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::filter::PageMeta;

/// Wrapper for API responses that adds the `{"data": ...}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

fn serialize_or_500<T: Serialize>(data: &T) -> Result<Value, Response> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Failed to serialize response data: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": true,
                "message": "Failed to serialize response data",
                "code": "INTERNAL_SERVER_ERROR"
            })),
        )
            .into_response()
    })
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serialize_or_500(&self.data) {
            Ok(data) => (self.status_code, Json(json!({ "data": data }))).into_response(),
            Err(response) => response,
        }
    }
}

/// Page of resources plus `meta` paging block
#[derive(Debug)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> Response {
        match serialize_or_500(&self.data) {
            Ok(data) => Json(json!({ "data": data, "meta": self.meta })).into_response(),
            Err(response) => response,
        }
    }
}

/// `{"message": "..."}` acknowledgement
#[derive(Debug)]
pub struct MessageResponse(pub &'static str);

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        Json(json!({ "message": self.0 })).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
