use crate::{context::AppContext, extract::CurrentUser, response::Result, service::Pagination};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use picnest_core::json;
use picnest_model::{ImageUpdate, PublicationInput, PublicationUpdate};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct TransformRequest {
    key: String,
}

pub(crate) async fn upload_image(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result {
    let bytes = super::read_file(multipart).await?;
    let url = ctx.images().upload_temp(&user, bytes).await?;
    Ok(Json(json!({ "current_img": url })))
}

pub(crate) async fn transform_image(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<TransformRequest>,
) -> Result {
    let url = ctx.images().transform_temp(&user, &body.key).await?;
    Ok(Json(json!({ "updated_img": url })))
}

pub(crate) async fn create(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<PublicationInput>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let publication = ctx.publications().create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(json!(publication))))
}

pub(crate) async fn list_all(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result {
    let publications = ctx.publications().list_all(&user, page).await?;
    Ok(Json(json!(publications)))
}

pub(crate) async fn list_my(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result {
    let publications = ctx.publications().list_by_owner(&user, page).await?;
    Ok(Json(json!(publications)))
}

pub(crate) async fn view(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result {
    let publication = ctx.publications().get(&user, id).await?;
    Ok(Json(json!(publication)))
}

pub(crate) async fn update_text(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<PublicationUpdate>,
) -> Result {
    let publication = ctx.publications().update_text(&user, id, update).await?;
    Ok(Json(json!(publication)))
}

pub(crate) async fn update_image(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<ImageUpdate>,
) -> Result {
    let publication = ctx.publications().update_image(&user, id, update).await?;
    Ok(Json(json!(publication)))
}

pub(crate) async fn transform(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path((id, key)): Path<(i64, String)>,
) -> Result {
    let image = ctx.publications().transform_image(&user, id, &key).await?;
    Ok(Json(json!(image)))
}

pub(crate) async fn qr_code(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result {
    let image = ctx.publications().generate_qr_code(&user, id).await?;
    Ok(Json(json!(image)))
}

pub(crate) async fn delete(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result {
    let publication = ctx.publications().delete(&user, id).await?;
    Ok(Json(json!(publication)))
}
