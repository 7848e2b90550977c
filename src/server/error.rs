use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::errors::{CoreError, CoreErrorKind};

/// Message returned to clients for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug)]
pub struct ApiError(pub CoreError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            CoreErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
            CoreErrorKind::Conflict => StatusCode::CONFLICT,
            CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CoreError::invalid_argument(format!(
            "Missing or invalid body parameters: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match std::error::Error::source(&self.0) {
                Some(source) => error!("{}: {}", self.0, source),
                None => error!("{}", self.0),
            }
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self.0);
            self.0.message().to_string()
        };

        let body = json!({
            "success": false,
            "error": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (CoreError::invalid_argument("bad"), StatusCode::BAD_REQUEST),
            (CoreError::not_found("Project", 9), StatusCode::NOT_FOUND),
            (CoreError::conflict("busy"), StatusCode::CONFLICT),
            (CoreError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn internal_details_stay_server_side() {
        let response = ApiError(CoreError::internal("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
