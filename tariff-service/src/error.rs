use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meter_client::BillingError;
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("no readings for meter {0} in the requested window")]
    MeterNotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Billing(BillingError::InvalidInput(_)) => "InvalidInput",
            Self::Billing(BillingError::InvalidCategory(_)) => "InvalidCategory",
            Self::BadRequest(_) => "BadRequest",
            Self::MeterNotFound(_) => "NotFound",
            Self::Storage(_) => "StorageError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Billing(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MeterNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        metrics::counter!("api_errors_total", "kind" => kind).increment(1);
        if let Self::Storage(_) = self {
            tracing::error!(error = %self, "storage query failed");
        } else {
            tracing::debug!(error = %self, kind, "request rejected");
        }

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
