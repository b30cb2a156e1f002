//! # Request Extraction & Validation
//!
//! [`ValidatedJson`] deserializes a JSON body and then runs the DTO's
//! business-rule validation, mapping both failure modes onto the error
//! taxonomy (400 for unparseable bodies, 422 for rule violations).

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Business-rule validation for request DTOs, beyond what serde checks.
pub trait Validate {
    /// Returns the violated rule on failure.
    fn validate(&self) -> Result<(), String>;
}

/// JSON extractor that also runs [`Validate`].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Dto {
        name: String,
    }

    impl Validate for Dto {
        fn validate(&self) -> Result<(), String> {
            if self.name.is_empty() {
                return Err("name must not be empty".into());
            }
            Ok(())
        }
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let req = json_request(r#"{"name": "ok"}"#);
        let ValidatedJson(dto) = ValidatedJson::<Dto>::from_request(req, &()).await.unwrap();
        assert_eq!(dto.name, "ok");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let req = json_request("{not json");
        let err = ValidatedJson::<Dto>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn rule_violation_is_validation_error() {
        let req = json_request(r#"{"name": ""}"#);
        let err = ValidatedJson::<Dto>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
