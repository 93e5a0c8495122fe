use crate::{context::AppContext, extract::CurrentUser, response::Result};
use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use picnest_core::json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct UsernameRequest {
    username: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AboutRequest {
    about: Option<String>,
}

pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Result {
    Ok(Json(json!(user)))
}

pub(crate) async fn profile(
    State(ctx): State<Arc<AppContext>>,
    Path(username): Path<String>,
) -> Result {
    let profile = ctx.profiles().view(&username).await?;
    Ok(Json(json!(profile)))
}

pub(crate) async fn change_username(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UsernameRequest>,
) -> Result {
    let user = ctx.profiles().change_username(&user, &body.username).await?;
    Ok(Json(json!(user)))
}

pub(crate) async fn change_about(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AboutRequest>,
) -> Result {
    let user = ctx
        .profiles()
        .change_about(&user, body.about.as_deref())
        .await?;
    Ok(Json(json!(user)))
}

pub(crate) async fn change_avatar(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result {
    let bytes = super::read_file(multipart).await?;
    let user = ctx.profiles().change_avatar(&user, bytes).await?;
    Ok(Json(json!(user)))
}
