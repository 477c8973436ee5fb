use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::ApiError;

use super::{Schema, validate};

/// JSON body extractor that runs the payload through a [`Schema`] first.
///
/// Rejects with `400 {"success": false, "error": ...}` on the first
/// violation, or with the body parser's own status when the body is not JSON.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(Self(validate(value)?))
    }
}
