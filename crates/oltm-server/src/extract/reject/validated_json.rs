//! JSON extractor that also runs `validator` rules.

use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::Json;
use crate::handler::{Error, ErrorKind};
use crate::handler::response::ErrorResponse;

/// Deserializes like [`Json`], then calls [`Validate::validate`].
///
/// Validation failures become `bad_request` responses listing every failed
/// field.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Rejection of [`ValidateJson`].
#[derive(Debug)]
pub enum ValidateJsonRejection {
    /// The body could not be deserialized.
    Json(Error<'static>),
    /// The body deserialized but broke a validation rule.
    Invalid(ErrorResponse<'static>),
}

impl IntoResponse for ValidateJsonRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Json(error) => error.into_response(),
            Self::Invalid(response) => response.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = ValidateJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(ValidateJsonRejection::Json)?;

        if let Err(errors) = data.validate() {
            tracing::debug!(
                target: "oltm_server::extract::reject",
                fields = ?errors.field_errors().keys().collect::<Vec<_>>(),
                "Request validation failed"
            );

            let response = ErrorResponse::from_validation_errors(&errors)
                .with_message(summarize(&errors));
            return Err(ValidateJsonRejection::Invalid(response));
        }

        Ok(Self::new(data))
    }
}

/// Builds a one-line message naming the failed fields.
fn summarize(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().keys().map(|f| f.to_string()).collect();
    fields.sort();
    format!("Invalid value for: {}", fields.join(", "))
}

impl From<ValidateJsonRejection> for Error<'static> {
    fn from(rejection: ValidateJsonRejection) -> Self {
        match rejection {
            ValidateJsonRejection::Json(error) => error,
            ValidateJsonRejection::Invalid(response) => {
                ErrorKind::BadRequest.with_message(response.message.into_owned())
            }
        }
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}
