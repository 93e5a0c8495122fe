//! HTTP responses for `axum`.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use picnest_core::response::Rejection;

/// Result of a request handler.
pub(crate) type Result<T = Json<serde_json::Value>> = std::result::Result<T, AxumRejection>;

/// An HTTP rejection response for `axum`.
#[derive(Debug)]
pub(crate) struct AxumRejection(Rejection);

impl From<Rejection> for AxumRejection {
    #[inline]
    fn from(rejection: Rejection) -> Self {
        Self(rejection)
    }
}

impl IntoResponse for AxumRejection {
    fn into_response(self) -> Response {
        let rejection = self.0;
        let status_code = StatusCode::from_u16(rejection.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if let Some(err) = rejection.server_error() {
            tracing::error!(
                code = rejection.code().as_str(),
                status_code = status_code.as_u16(),
                "{err}"
            );
        } else {
            tracing::warn!(
                code = rejection.code().as_str(),
                status_code = status_code.as_u16(),
                "{}",
                rejection.message()
            );
        }
        (status_code, Json(rejection.to_json())).into_response()
    }
}
