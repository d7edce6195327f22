use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Subscription not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to {operation} subscription: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: DbErr,
    },
}

pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

impl SubscriptionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Convert SubscriptionError to AppError for standardized error responses.
///
/// Storage failures are reported as a generic 500; the driver message stays in the logs.
impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::InvalidArgument(msg) => AppError::BadRequest(msg),
            SubscriptionError::NotFound(id) => {
                AppError::NotFound(format!("Subscription {} not found", id))
            }
            SubscriptionError::Persistence { operation, .. } => {
                AppError::InternalServerError(format!("Failed to {} subscription", operation))
            }
        }
    }
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
