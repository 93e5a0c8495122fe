use axum::{
    body::Body,
    http::{Request, Response},
};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier},
    trace::{DefaultOnBodyChunk, DefaultOnEos, TraceLayer},
};
use tracing::{Span, field::Empty};

// Type aliases.
type NewMakeSpan = fn(&Request<Body>) -> Span;
type NewOnRequest = fn(&Request<Body>, &Span);
type NewOnResponse = fn(&Response<Body>, Duration, &Span);
type NewOnFailure = fn(ServerErrorsFailureClass, Duration, &Span);
type NewTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    NewMakeSpan,
    NewOnRequest,
    NewOnResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    NewOnFailure,
>;

/// Creates the tracing middleware.
pub(crate) fn tracing_layer() -> NewTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(new_make_span as NewMakeSpan)
        .on_request(new_on_request as NewOnRequest)
        .on_response(new_on_response as NewOnResponse)
        .on_failure(new_on_failure as NewOnFailure)
}

fn new_make_span(request: &Request<Body>) -> Span {
    let uri = request.uri();
    let headers = request.headers();
    tracing::info_span!(
        "HTTP request",
        "otel.kind" = "server",
        "http.method" = request.method().as_str(),
        "http.target" = uri.path_and_query().map(|p| p.as_str()),
        "http.user_agent" = headers.get("user-agent").and_then(|v| v.to_str().ok()),
        "http.status_code" = Empty,
        "http.server.duration" = Empty,
        "context.request_id" = headers.get("x-request-id").and_then(|v| v.to_str().ok()),
    )
}

fn new_on_request(_request: &Request<Body>, _span: &Span) {
    tracing::debug!("started processing request");
}

fn new_on_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("http.status_code", response.status().as_u16());
    span.record(
        "http.server.duration",
        u64::try_from(latency.as_millis()).ok(),
    );
    tracing::info!("finished processing request");
}

fn new_on_failure(error: ServerErrorsFailureClass, latency: Duration, span: &Span) {
    span.record(
        "http.server.duration",
        u64::try_from(latency.as_millis()).ok(),
    );
    if let ServerErrorsFailureClass::StatusCode(status_code) = error {
        span.record("http.status_code", status_code.as_u16());
    }
    tracing::error!("{error}");
}
