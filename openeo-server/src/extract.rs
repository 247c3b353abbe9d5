//! Request extractors whose rejections go through [`ApiError`].

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use openeo_core::{CoreError, OpenEoBackend};
use openeo_model::User;

use crate::infra::errors::ApiError;

/// JSON body; malformed input becomes a 400 error document.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters with normalized rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The caller, resolved from the `Authorization` header by the backend.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<B> FromRequestParts<Arc<B>> for AuthenticatedUser
where
    B: OpenEoBackend,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        backend: &Arc<B>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str())
            .transpose()
            .map_err(|_| CoreError::token_invalid())?;

        let user = backend.authenticate(header).await?;
        Ok(Self(user))
    }
}
