use picnest_core::extension::TomlTableExt;
use std::time::Duration;
use toml::Table;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};

/// Creates the CORS middleware from the `[cors]` config.
pub(crate) fn cors_layer(config: Option<&Table>) -> CorsLayer {
    let Some(cors) = config else {
        return CorsLayer::permissive();
    };
    let allow_credentials = cors.get_bool("allow-credentials").unwrap_or(false);
    let allow_origin = cors
        .get_array("allow-origin")
        .map(|values| {
            let origins = values
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
                .collect::<Vec<_>>();
            AllowOrigin::list(origins)
        })
        .unwrap_or_else(AllowOrigin::mirror_request);
    let allow_methods = cors
        .get_array("allow-methods")
        .map(|values| {
            let methods = values
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
                .collect::<Vec<_>>();
            AllowMethods::list(methods)
        })
        .unwrap_or_else(AllowMethods::mirror_request);
    let allow_headers = cors
        .get_array("allow-headers")
        .map(|values| {
            let header_names = values
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
                .collect::<Vec<_>>();
            AllowHeaders::list(header_names)
        })
        .unwrap_or_else(AllowHeaders::mirror_request);
    let expose_headers = cors
        .get_array("expose-headers")
        .map(|values| {
            let header_names = values
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
                .collect::<Vec<_>>();
            ExposeHeaders::list(header_names)
        })
        .unwrap_or_default();
    let max_age = cors
        .get_duration("max-age")
        .unwrap_or_else(|| Duration::from_secs(60 * 60));
    CorsLayer::new()
        .allow_credentials(allow_credentials)
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(allow_headers)
        .expose_headers(expose_headers)
        .max_age(max_age)
}

#[cfg(test)]
mod tests {
    use super::cors_layer;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/healthchecker")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn it_answers_preflight_requests() {
        let config: toml::Table = toml::from_str(
            r#"
            allow-origin = ["http://localhost:3000"]
            allow-methods = ["GET", "POST"]
            max-age = "10m"
            "#,
        )
        .unwrap();
        let app = Router::new()
            .route("/healthchecker", get(|| async { "ok" }))
            .layer(cors_layer(Some(&config)));

        let response = app
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,POST");

        let response = app.oneshot(preflight("http://evil.test")).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );

        let permissive = Router::new()
            .route("/healthchecker", get(|| async { "ok" }))
            .layer(cors_layer(None));
        let response = permissive
            .oneshot(preflight("http://evil.test"))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
