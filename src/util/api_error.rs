use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::aggregation::QueryError;

pub struct ApiError(pub QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            QueryError::InvalidChannel(_) | QueryError::InvalidDateRange { .. } => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            QueryError::Cancelled(_) => (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string()),
            QueryError::Database(err) => {
                error!("Database Error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
