//! Extractors and validation utilities for API DTOs.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A body extractor that accepts JSON or a urlencoded form and validates it.
///
/// Requests declaring `application/json` are parsed as JSON; anything else is
/// parsed as `application/x-www-form-urlencoded`, which is what browser file
/// manager widgets post. The value is then validated with the `validator`
/// crate and field-level errors are reported as a 400.
///
/// # Example
///
/// ```ignore
/// use filebay::web::dto::Payload;
///
/// async fn make_dir(
///     Payload(request): Payload<MakeRequest>,
/// ) -> Result<Json<FileEntry>, ApiError> {
///     // request is already validated
///     // ...
/// }
/// ```
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let value = if is_json {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            value
        } else {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            value
        };

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(Payload(value))
    }
}

/// A query-string extractor that reports failures as JSON API errors.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryParams(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}
