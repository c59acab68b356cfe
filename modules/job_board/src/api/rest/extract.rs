use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use api_ingress::{AppError, FieldError};

use crate::api::rest::error::map_domain_error;
use crate::contract::model::Principal;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// JSON body that is deserialized and then checked with `validator`.
/// Both failures answer 400 with the uniform error body.
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
            .map_err(|rejection| AppError::Validation {
                message: "Invalid input".to_string(),
                errors: vec![FieldError {
                    field: "body".to_string(),
                    message: rejection.body_text(),
                }],
            })?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Principal of the caller, taken from `Authorization: Bearer <token>`.
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let svc = parts
            .extensions
            .get::<Arc<Service>>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("job board service not installed")))?;

        let token = bearer_token(parts).ok_or_else(|| map_domain_error(DomainError::MissingToken))?;
        svc.authenticate(token)
            .map(AuthUser)
            .map_err(map_domain_error)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Path ids that are not UUIDs cannot name an existing record.
pub fn parse_id(raw: &str, not_found: fn(Uuid) -> DomainError) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| map_domain_error(not_found(Uuid::nil())))
}
