use crate::{
    context::AppContext,
    controller::{auth, comment, health, publication, rating, tag, user},
};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;

/// Routes nested under `/api/v1`.
pub(crate) fn routes() -> Vec<Router<Arc<AppContext>>> {
    let mut routes = Vec::new();

    // Auth controller.
    let router = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh_token", get(auth::refresh_token))
        .route("/auth/confirmed_email/{token}", get(auth::confirmed_email))
        .route("/auth/request_email", post(auth::request_email))
        .route("/auth/block_user/{user_id}", post(auth::block_user));
    routes.push(router);

    // User controller.
    let router = Router::new()
        .route("/users/me", get(user::me))
        .route("/profile/username", patch(user::change_username))
        .route("/profile/about", patch(user::change_about))
        .route("/profile/avatar", patch(user::change_avatar))
        .route("/profile/{username}", get(user::profile));
    routes.push(router);

    // Publication controller.
    let router = Router::new()
        .route("/publications/upload_image", post(publication::upload_image))
        .route("/publications/transform_image", put(publication::transform_image))
        .route("/publications/create", post(publication::create))
        .route("/publications/all", get(publication::list_all))
        .route("/publications/all_my", get(publication::list_my))
        .route("/publications/{id}", get(publication::view))
        .route("/publications/{id}/update_text", put(publication::update_text))
        .route("/publications/{id}/update_image", put(publication::update_image))
        .route("/publications/{id}/transform/{key}", post(publication::transform))
        .route("/publications/{id}/qr_code", get(publication::qr_code))
        .route("/publications/{id}/delete", delete(publication::delete));
    routes.push(router);

    // Tag controller.
    let router = Router::new()
        .route("/tags/create", post(tag::create))
        .route("/tags/{publication_id}", get(tag::list))
        .route("/tags/{publication_id}/add", put(tag::add))
        .route("/tags/{publication_id}/remove", delete(tag::remove))
        .route("/tags/{publication_id}/remove_all", delete(tag::remove_all));
    routes.push(router);

    // Rating controller.
    let router = Router::new()
        .route("/publications/{id}/rating/add", post(rating::add))
        .route("/publications/{id}/rating/users", get(rating::raters))
        .route("/admin/users/{user_id}/ratings", get(rating::user_ratings))
        .route(
            "/publications/{id}/ratings/{user_id}/delete",
            delete(rating::delete),
        );
    routes.push(router);

    // Comment controller.
    let router = Router::new()
        .route("/publications/{id}/comments", get(comment::list))
        .route("/publications/{id}/comments/add", post(comment::add))
        .route(
            "/publications/{id}/comments/{comment_id}",
            get(comment::view),
        )
        .route(
            "/publications/{id}/comments/{comment_id}/edit",
            patch(comment::edit),
        )
        .route(
            "/publications/{id}/comments/{comment_id}/delete",
            delete(comment::delete),
        );
    routes.push(router);

    // Health controller.
    let router = Router::new().route("/healthchecker", get(health::healthchecker));
    routes.push(router);

    routes
}

/// Builds the API router with the shared context.
pub(crate) fn api_router(ctx: Arc<AppContext>) -> Router {
    let mut api = Router::new();
    for route in routes() {
        api = api.merge(route);
    }
    Router::new().nest("/api/v1", api).with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::api_router;
    use crate::testing;
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode, header},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn read_json(res: axum::response::Response) -> Value {
        let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn it_serves_the_api() {
        let (ctx, _) = testing::context().await;
        let app = api_router(ctx.clone());

        let req = Request::get("/api/v1/healthchecker")
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let req = Request::get("/api/v1/users/me").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(res).await["code"], "invalid_token");

        let req = Request::post("/api/v1/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"alice","email":"alice@x.com","password":"secret1"}"#,
            ))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = Request::post("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"alice@x.com","password":"secret1"}"#))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(res).await["code"], "email_not_confirmed");

        let bob = testing::sign_up(&ctx, "bob").await;
        let tokens = ctx.auth().login(bob.email(), "secret1").await.unwrap();
        let req = Request::get("/api/v1/users/me")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", tokens.access_token),
            )
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let data = read_json(res).await;
        assert_eq!(data["username"], "bob");
        assert_eq!(data["role"], "user");
        assert!(data.get("password_hash").is_none());
    }
}
