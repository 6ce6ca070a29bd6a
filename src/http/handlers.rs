//! API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::StoreError;

/// `GET /api/connection-data`: every logged check as a JSON array.
pub async fn connection_data(State(state): State<AppState>) -> Response {
    match state.reader.read_all().await {
        Ok(records) => {
            metrics::record_api_request("ok");
            Json(records).into_response()
        }
        Err(StoreError::Io(e)) => {
            metrics::record_api_request("read_error");
            tracing::error!(
                error = %e,
                log_file = %state.reader.path().display(),
                "Unable to read log file"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Unable to read log file").into_response()
        }
        Err(StoreError::Parse(e)) => {
            metrics::record_api_request("parse_error");
            tracing::error!(
                error = %e,
                log_file = %state.reader.path().display(),
                "Error parsing CSV data"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Error parsing CSV data").into_response()
        }
    }
}

/// `OPTIONS /api/connection-data`: CORS preflight, empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
