pub mod auth;
pub mod discover;
pub mod dto;
pub mod post;
pub mod venue;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

/// A missing or unparseable JSON body reads as an empty object so that field
/// validation decides the response. Well-formed JSON whose fields have the
/// wrong type is rejected with the deserializer's message, which names the field.
pub(crate) fn json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(inner)) => Ok(inner),
        Err(rejection @ JsonRejection::JsonDataError(_)) => {
            Err(ApiError::validation(rejection.body_text()))
        }
        Err(_) => Ok(T::default()),
    }
}
