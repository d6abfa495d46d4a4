use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{ErrorKind, OperationOutcome};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// API error carrying the failure half of an [`OperationOutcome`]
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Handler result: the success envelope or an [`ApiError`]
pub type ApiResult<T> = Result<Json<OperationOutcome<T>>, ApiError>;

/// Handler result for inserts, answered with 201
pub type CreatedResult<T> = Result<(StatusCode, Json<OperationOutcome<T>>), ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailure, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        status_for(self.kind)
    }

    /// Stable error code, as carried in the `X-Error-Code` header
    pub fn error_code(&self) -> &'static str {
        self.kind.code()
    }
}

/// HTTP status for each failure category
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidTransition | ErrorKind::CapacityExceeded => StatusCode::CONFLICT,
        ErrorKind::PartialApplication => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::RemotePersistenceFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() || self.kind.leaves_inconsistent_state() {
            error!(
                error_id = %error_id,
                error_kind = %self.kind,
                status_code = %status_code.as_u16(),
                error = %self.message,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_kind = %self.kind,
                status_code = %status_code.as_u16(),
                "Request rejected"
            );
        }

        let code = self.error_code();
        let body: OperationOutcome<()> = OperationOutcome::failure(self.kind, self.message);
        (
            status_code,
            [("x-error-code", code), ("x-error-id", error_id.as_str())],
            Json(body),
        )
            .into_response()
    }
}

/// Helper trait for turning coordinator outcomes into handler results
pub trait IntoApiResponse<T> {
    fn into_api_response(self) -> ApiResult<T>;

    fn into_created(self) -> CreatedResult<T>
    where
        Self: Sized,
    {
        self.into_api_response().map(|json| (StatusCode::CREATED, json))
    }
}

impl<T> IntoApiResponse<T> for OperationOutcome<T> {
    fn into_api_response(self) -> ApiResult<T> {
        if self.success {
            return Ok(Json(self));
        }
        let kind = self.error_kind.unwrap_or(ErrorKind::RemotePersistenceFailure);
        let message = self.error.unwrap_or_else(|| kind.to_string());
        Err(ApiError::new(kind, message))
    }
}

/// Wrap a plain read in the success envelope
pub fn api_success<T>(data: T) -> ApiResult<T> {
    Ok(Json(OperationOutcome::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::ValidationFailure), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidTransition), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::CapacityExceeded), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::PartialApplication), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::RemotePersistenceFailure), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Configuration), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn failed_outcome_becomes_api_error() {
        let outcome: OperationOutcome<u8> = OperationOutcome::failure(ErrorKind::CapacityExceeded, "Ward is full");
        let err = outcome.into_api_response().unwrap_err();
        assert_eq!(err, ApiError::new(ErrorKind::CapacityExceeded, "Ward is full"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn successful_outcome_passes_through() {
        let Json(outcome) = OperationOutcome::success(7u8).into_api_response().unwrap();
        assert_eq!(outcome.into_data(), Some(7));
    }
}
