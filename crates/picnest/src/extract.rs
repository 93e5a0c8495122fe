//! Request extractors.
use crate::{context::AppContext, response::AxumRejection};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use picnest_core::response::{ErrorCode, Rejection};
use picnest_model::User;
use std::sync::Arc;

/// The user authenticated by the bearer access token.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser(pub(crate) User);

/// The bearer token of the `authorization` header.
#[derive(Debug, Clone)]
pub(crate) struct BearerToken(pub(crate) String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AxumRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
            })
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Rejection::from_code(ErrorCode::InvalidToken))?;
        Ok(Self(token.to_owned()))
    }
}

impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = AxumRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, ctx).await?;
        let user = ctx.auth().authenticate(&token).await?;
        Ok(Self(user))
    }
}
