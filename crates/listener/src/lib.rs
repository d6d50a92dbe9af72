//! Inbound HTTP surface for the blog pipeline.
//!
//! Exposes one [`pipeline::BlogPipeline`] over four JSON routes:
//!
//! | Route | Pipeline operation |
//! |-------|--------------------|
//! | `POST /generate-post` | [`pipeline::BlogPipeline::generate_post`] |
//! | `POST /post-to-wordpress` | [`pipeline::BlogPipeline::publish_post`] |
//! | `GET /coupang-products` | [`pipeline::BlogPipeline::review_products`] |
//! | `GET /health` | liveness only |
//!
//! Every failure answers `{"success": false, "error": "..."}`. Missing input
//! and unparseable bodies are `400`; search and generation failures are `500`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request parsing, status mapping and the HTTP server
//! live here. The [`pipeline`] crate never sees a request or response type.

mod handlers;
mod reply;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use pipeline::BlogPipeline;

pub use reply::ApiError;

/// Builds the application router around a shared pipeline.
pub fn router(pipeline: Arc<BlogPipeline>) -> Router {
    Router::new()
        .route("/generate-post", post(handlers::generate_post))
        .route("/post-to-wordpress", post(handlers::post_to_wordpress))
        .route("/coupang-products", get(handlers::coupang_products))
        .route("/health", get(handlers::health))
        .with_state(pipeline)
}

/// Serves [`router`] on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    pipeline: Arc<BlogPipeline>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown)
        .await
}
