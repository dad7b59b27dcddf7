use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::error::Error;

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    reason: Option<&'static str>,
}

macro_rules! error_response {
    ($status_code:expr) => {
        (
            $status_code,
            Json(ErrorBody {
                code: $status_code.as_u16(),
                reason: None,
            }),
        )
            .into_response()
    };
    ($status_code:expr, $reason:literal) => {
        (
            $status_code,
            Json(ErrorBody {
                code: $status_code.as_u16(),
                reason: Some($reason),
            }),
        )
            .into_response()
    };
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::InvalidRule(_) => error_response!(StatusCode::BAD_REQUEST),
            Error::InvalidInstant => {
                error_response!(StatusCode::BAD_REQUEST, "Invalid Instant")
            }
            Error::StatusUnavailable => error_response!(StatusCode::SERVICE_UNAVAILABLE),
            _ => error_response!(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
