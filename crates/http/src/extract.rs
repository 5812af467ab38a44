//! Request extractors that turn malformed input into [`AppError`] responses

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has been deserialized and passed its `validator` rules.
///
/// Both decoding failures and rule violations reject with
/// [`AppError::Validation`], before any handler code runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    Vec::new(),
                    format!("Invalid request payload: {}", rejection.body_text()),
                )
            })?;

        value
            .validate()
            .map_err(|errors| AppError::validation(validation_details(&errors), "Validation failed"))?;

        Ok(Self(value))
    }
}

/// Flatten `validator` field errors into response details, ordered by field.
pub fn validation_details(errors: &ValidationErrors) -> Vec<serde_json::Value> {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                serde_json::json!({
                    "field": field,
                    "error": error.code,
                    "message": error.message,
                })
            })
        })
        .collect()
}
