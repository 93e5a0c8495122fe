use crate::{context::AppContext, extract::CurrentUser, response::Result, service::Pagination};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use picnest_core::json;
use picnest_model::CommentInput;
use std::sync::Arc;

pub(crate) async fn list(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result {
    let comments = ctx.comments().list(id, page).await?;
    Ok(Json(json!(comments)))
}

pub(crate) async fn view(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(_user): CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result {
    let comment = ctx.comments().get(id, comment_id).await?;
    Ok(Json(json!(comment)))
}

pub(crate) async fn add(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let comment = ctx.comments().add(&user, id, input).await?;
    Ok((StatusCode::CREATED, Json(json!(comment))))
}

pub(crate) async fn edit(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
    Json(input): Json<CommentInput>,
) -> Result {
    let comment = ctx.comments().edit(&user, id, comment_id, input).await?;
    Ok(Json(json!(comment)))
}

pub(crate) async fn delete(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result {
    let comment = ctx.comments().delete(&user, id, comment_id).await?;
    Ok(Json(json!(comment)))
}
