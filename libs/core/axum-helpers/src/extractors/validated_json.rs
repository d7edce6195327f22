//! JSON extractor with validation via the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the body and runs `Validate` before the handler sees it.
///
/// Malformed JSON becomes `JSON_EXTRACTION`, rule violations become
/// `VALIDATION_ERROR` with per-field details. Both are 400.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateSubscription {
///     #[validate(length(min = 1, max = 255))]
///     service_name: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateSubscription>) {}
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
