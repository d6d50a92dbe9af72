use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use pipeline::{BlogPipeline, PublishResult, ReviewedProduct};

use crate::reply::ApiError;

type Shared = State<Arc<BlogPipeline>>;

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default, rename = "autoPostToWordPress")]
    auto_publish: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateReply {
    success: bool,
    blog_post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    wordpress: Option<PublishResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsQuery {
    keyword: Option<String>,
    /// Parsed leniently; anything without leading digits means "default".
    limit: Option<String>,
}

/// Leading decimal digits of `raw`, ignoring surrounding whitespace.
fn lenient_limit(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductsReply {
    success: bool,
    products: Vec<ReviewedProduct>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        warn!(error = %rejection.body_text(), "unreadable request body");
        ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })
}

pub(crate) async fn generate_post(
    State(pipeline): Shared,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateReply>, ApiError> {
    let request = body(payload)?;
    let keyword = request.keyword.unwrap_or_default();
    let outcome = pipeline
        .generate_post(&keyword, request.auto_publish)
        .await?;
    Ok(Json(GenerateReply {
        success: true,
        blog_post: outcome.post.html,
        wordpress: outcome.publish,
    }))
}

/// `200` on success, `503` when publishing is not configured, `500` otherwise.
pub(crate) async fn post_to_wordpress(
    State(pipeline): Shared,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublishResult>), ApiError> {
    let request = body(payload)?;
    let result = pipeline
        .publish_post(
            request.title.as_deref(),
            request.content.as_deref().unwrap_or_default(),
            request.keyword.as_deref().unwrap_or_default(),
        )
        .await?;
    let status = if result.success {
        StatusCode::OK
    } else if result.is_disabled() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)))
}

pub(crate) async fn coupang_products(
    State(pipeline): Shared,
    query: Result<Query<ProductsQuery>, QueryRejection>,
) -> Result<Json<ProductsReply>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::bad_request(format!("invalid query: {}", e.body_text())))?;
    let products = pipeline
        .review_products(
            query.keyword.as_deref().unwrap_or_default(),
            query.limit.as_deref().and_then(lenient_limit),
        )
        .await?;
    Ok(Json(ProductsReply {
        success: true,
        products,
    }))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
