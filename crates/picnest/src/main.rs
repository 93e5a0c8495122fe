//! The HTTP server of picnest.

mod context;
mod controller;
mod extract;
mod mailer;
mod middleware;
mod response;
mod router;
mod service;

#[cfg(test)]
mod testing;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode, response::IntoResponse};
use context::AppContext;
use picnest_core::{
    error::Error,
    extension::TomlTableExt,
    response::Rejection,
    state::{Env, State},
    trace,
};
use std::{any::Any, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};
use tokio::{net::TcpListener, runtime::Builder, signal};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};

fn main() -> ExitCode {
    let state = match State::load(Env::from_args()) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("fail to load the config: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = trace::init(&state) {
        eprintln!("fail to initialize the tracing subscriber: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match Builder::new_multi_thread()
        .thread_keep_alive(Duration::from_secs(60))
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("fail to build Tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(serve(state)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("picnest server error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(state: State) -> Result<(), Error> {
    let ctx = Arc::new(AppContext::with_state(&state).await?);

    // Server config
    let mut host = "127.0.0.1";
    let mut port = 6080;
    let mut body_limit = 16 * 1024 * 1024; // 16MB
    let mut request_timeout = Duration::from_secs(60);
    if let Some(config) = state.get_config("server") {
        if let Some(value) = config.get_str("host") {
            host = value;
        }
        if let Some(value) = config.get_u16("port") {
            port = value;
        }
        if let Some(limit) = config.get_usize("body-limit") {
            body_limit = limit;
        }
        if let Some(timeout) = config.get_duration("request-timeout") {
            request_timeout = timeout;
        }
    }

    let mut app = router::api_router(ctx.clone());
    if let Some(config) = state.get_config("storage") {
        if config.get_str("scheme").unwrap_or("fs") == "fs" {
            let root = config.get_str("root").unwrap_or("local/blobs");
            let route_prefix = config.get_str("route-prefix").unwrap_or("/blobs");
            app = app.nest_service(route_prefix, ServeDir::new(root));
            tracing::info!("blobs `{route_prefix}/**` are served from `{root}`");
        }
    }
    let app = with_layers(app, state.get_config("cors"), body_limit, request_timeout);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| Error::with_source(format!("fail to listen on {addr}"), err))?;
    tracing::warn!(
        app_env = state.env().as_str(),
        app_name = state.name(),
        app_version = env!("CARGO_PKG_VERSION"),
        "listen on `{addr}`",
    );
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown())
    .await;
    ctx.pool().close().await;
    result.map_err(Error::from)
}

/// Wraps the router with the middleware stack; the last layer is the outermost.
fn with_layers(
    app: Router,
    cors: Option<&toml::Table>,
    body_limit: usize,
    request_timeout: Duration,
) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::cors_layer(cors))
        .layer(middleware::tracing_layer())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.to_owned()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "Unknown panic message".to_owned()
    };
    let rejection = Rejection::internal_server_error(Error::new(details));
    response::AxumRejection::from(rejection).into_response()
}

async fn shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("fail to install the `Ctrl+C` handler: {err}");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("fail to install the terminate signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    tracing::warn!("signal received, starting graceful shutdown");
}
