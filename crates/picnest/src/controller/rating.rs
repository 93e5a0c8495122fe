use crate::{context::AppContext, extract::CurrentUser, response::Result, service::Pagination};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use picnest_core::json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    score: i64,
}

pub(crate) async fn add(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ScoreRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let rating = ctx.ratings().add(&user, id, body.score).await?;
    Ok((StatusCode::CREATED, Json(json!(rating))))
}

pub(crate) async fn raters(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result {
    let users = ctx.ratings().list_raters(&user, id, page).await?;
    Ok(Json(json!(users)))
}

pub(crate) async fn user_ratings(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result {
    let ratings = ctx.ratings().list_by_user(&user, user_id, page).await?;
    Ok(Json(json!(ratings)))
}

pub(crate) async fn delete(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result {
    let rating = ctx.ratings().delete(&user, user_id, id).await?;
    Ok(Json(json!(rating)))
}
