use crate::{context::AppContext, extract::CurrentUser, response::Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use picnest_core::json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct TagNames {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagName {
    name: String,
}

pub(crate) async fn create(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<TagNames>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let tags = ctx.tags().create_many(&body.names).await?;
    Ok((StatusCode::CREATED, Json(json!(tags))))
}

pub(crate) async fn list(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(_user): CurrentUser,
    Path(publication_id): Path<i64>,
) -> Result {
    let tags = ctx.tags().list_for_publication(publication_id).await?;
    Ok(Json(json!(tags)))
}

pub(crate) async fn add(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(publication_id): Path<i64>,
    Json(body): Json<TagName>,
) -> Result {
    let tag = ctx
        .publications()
        .add_tag(&user, publication_id, &body.name)
        .await?;
    Ok(Json(json!(tag)))
}

pub(crate) async fn remove(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(publication_id): Path<i64>,
    Json(body): Json<TagName>,
) -> Result {
    let tag = ctx
        .publications()
        .remove_tag(&user, publication_id, &body.name)
        .await?;
    Ok(Json(json!(tag)))
}

pub(crate) async fn remove_all(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(publication_id): Path<i64>,
) -> Result {
    let num_detached = ctx
        .publications()
        .remove_all_tags(&user, publication_id)
        .await?;
    Ok(Json(json!({ "num_detached": num_detached })))
}
