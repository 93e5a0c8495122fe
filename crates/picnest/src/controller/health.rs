use crate::{context::AppContext, response::Result};
use axum::{Json, extract::State};
use picnest_core::{
    json,
    response::{ErrorCode, Rejection},
};
use std::sync::Arc;

pub(crate) async fn healthchecker(State(ctx): State<Arc<AppContext>>) -> Result {
    let pool = ctx.pool();
    if pool.check_availability().await {
        Ok(Json(json!({
            "message": "Welcome to picnest!",
            "database": pool.name(),
        })))
    } else {
        Err(Rejection::with_error(
            ErrorCode::UpstreamUnavailable,
            picnest_core::error::Error::new("database is not configured correctly"),
        )
        .into())
    }
}
