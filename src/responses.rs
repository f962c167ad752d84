use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    fn with_status(code: StatusCode, success: bool, msg: &str) -> impl IntoResponse {
        (
            code,
            Json(JsonResponse {
                status: if success { "success" } else { "error" }.to_string(),
                success,
                message: msg.to_string(),
            }),
        )
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::OK, true, msg)
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::BAD_REQUEST, false, msg)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::UNAUTHORIZED, false, msg)
    }

    pub fn forbidden(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::FORBIDDEN, false, msg)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::NOT_FOUND, false, msg)
    }

    pub fn conflict(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::CONFLICT, false, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, false, msg)
    }

    pub fn bad_gateway(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::BAD_GATEWAY, false, msg)
    }
}
