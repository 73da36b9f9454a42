//! Request body extraction
//!
//! axum answers a body with the wrong shape with 422; the storefront API
//! treats every malformed body as a validation error (400).

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::AppError;

/// `Json<T>` whose rejections render as [`AppError::validation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), error = %rejection.body_text(), "Rejected request body");
                Err(AppError::validation(rejection.body_text()))
            }
        }
    }
}
