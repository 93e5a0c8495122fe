use crate::{
    context::AppContext,
    extract::{BearerToken, CurrentUser},
    response::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use picnest_core::json;
use picnest_model::SignupInput;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailRequest {
    email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BlockRequest {
    is_active: bool,
}

pub(crate) async fn signup(
    State(ctx): State<Arc<AppContext>>,
    Json(input): Json<SignupInput>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let user = ctx.auth().signup(input).await?;
    let data = json!({
        "user": user,
        "detail": "User successfully created. Check your email for confirmation.",
    });
    Ok((StatusCode::CREATED, Json(data)))
}

pub(crate) async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Result {
    let tokens = ctx.auth().login(&body.email, &body.password).await?;
    Ok(Json(json!(tokens)))
}

pub(crate) async fn logout(
    State(ctx): State<Arc<AppContext>>,
    BearerToken(refresh_token): BearerToken,
) -> Result {
    ctx.auth().logout(&refresh_token).await?;
    Ok(Json(json!({ "detail": "Logged out" })))
}

pub(crate) async fn refresh_token(
    State(ctx): State<Arc<AppContext>>,
    BearerToken(refresh_token): BearerToken,
) -> Result {
    let tokens = ctx.auth().refresh(&refresh_token).await?;
    Ok(Json(json!(tokens)))
}

pub(crate) async fn confirmed_email(
    State(ctx): State<Arc<AppContext>>,
    Path(token): Path<String>,
) -> Result {
    let user = ctx.auth().confirm_email(&token).await?;
    Ok(Json(json!({
        "detail": "Email confirmed",
        "email": user.email(),
    })))
}

pub(crate) async fn request_email(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<EmailRequest>,
) -> Result {
    let detail = if ctx.auth().request_email(&body.email).await? {
        "Check your email for confirmation."
    } else {
        "Your email is already confirmed"
    };
    Ok(Json(json!({ "detail": detail })))
}

pub(crate) async fn block_user(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(admin): CurrentUser,
    Path(user_id): Path<i64>,
    Json(body): Json<BlockRequest>,
) -> Result {
    let user = ctx
        .auth()
        .set_active(&admin, user_id, body.is_active)
        .await?;
    Ok(Json(json!(user)))
}
