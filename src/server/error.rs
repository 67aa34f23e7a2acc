//! HTTP rendering of [`ConvertError`].

use crate::error::ConvertError;
use crate::output::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_client_error() {
            warn!("Rejected request: {}", self);
        } else {
            error!("Request processing failed: {}", self);
        }

        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
