//! Tower middleware of the HTTP server.

mod tower_cors;
mod tower_tracing;

pub(crate) use tower_cors::cors_layer;
pub(crate) use tower_tracing::tracing_layer;
