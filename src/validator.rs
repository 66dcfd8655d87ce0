//! JSON extractor that runs `validator` rules before the handler sees the body.
//!
//! Rejections use the same `{"error", "field"}` shape as editor errors, so
//! clients can place a message next to the input it belongs to.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use feedbackhub_core::AppError;

/// First failing field and its message, fields taken in name order.
fn first_violation(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errors)| {
            errors.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ("body".to_string(), "Invalid request body".to_string()))
}

fn missing_field(body_text: &str) -> Option<&str> {
    body_text
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let body_text = rejection.body_text();
    if let Some(field) = missing_field(&body_text) {
        return AppError::bad_request(anyhow!("{} is required", field)).with_field(field);
    }
    if body_text.contains("unknown variant") {
        return AppError::bad_request(anyhow!(
            "Unknown subject type; expected Theory, Practical, Tutorial or \"Theory / Practical\""
        ))
        .with_field("type");
    }
    if body_text.contains("invalid type") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

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
            .map_err(rejection_to_error)?;

        value.validate().map_err(|errors| {
            let (field, message) = first_violation(&errors);
            AppError::unprocessable(anyhow!("{}", message)).with_field(field)
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::hierarchy::{NameDto, SubjectDto};
    use axum::body::Body;
    use axum::http::StatusCode;
    use feedbackhub_models::SubjectType;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_subject() {
        let ValidatedJson(dto) = ValidatedJson::<SubjectDto>::from_request(
            json_request(r#"{"name": "Optics", "type": "Theory / Practical"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(dto.name, "Optics");
        assert_eq!(dto.code, "");
        assert_eq!(dto.subject_type, SubjectType::TheoryPractical);
    }

    #[tokio::test]
    async fn test_missing_field_names_the_field() {
        let err = ValidatedJson::<NameDto>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("name"));
        assert_eq!(err.error.to_string(), "name is required");
    }

    #[tokio::test]
    async fn test_empty_name_is_unprocessable() {
        let err = ValidatedJson::<NameDto>::from_request(json_request(r#"{"name": ""}"#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn test_unknown_subject_type_is_rejected() {
        let err = ValidatedJson::<SubjectDto>::from_request(
            json_request(r#"{"name": "Optics", "type": "Lecture"}"#),
            &(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("type"));
    }
}
