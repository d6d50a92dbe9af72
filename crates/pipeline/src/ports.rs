//! Port traits: everything the pipeline needs from the outside world.
//!
//! The `pipeline` crate defines *what* is needed; the `coupang`, `llm` and
//! `wordpress` crates define *how* to supply it. Orchestration code only ever
//! holds these traits behind `Arc<dyn _>`.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::{GenerationError, SearchError};
use crate::{ChatRequest, Keyword, PostDraft, Product, PublishResult, Timestamp};

/// Source of the current wall-clock time.
///
/// Injected into the request signer so signatures are reproducible under a
/// frozen clock.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current UTC time.
    fn now(&self) -> Timestamp;
}

/// Searches the affiliate catalogue for products.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Returns up to `limit` products matching `keyword`, in upstream rank order.
    async fn search(&self, keyword: &Keyword, limit: u32) -> Result<Vec<Product>, SearchError>;
}

/// A generative-text provider that answers one chat completion request.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's text for `request`. No retries are attempted.
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError>;
}

/// Creates draft posts in a CMS.
///
/// Implementations never fail: every problem, including missing credentials,
/// is reported through the returned [`PublishResult`].
#[async_trait]
pub trait CmsPublisher: Send + Sync {
    async fn publish(&self, draft: &PostDraft) -> PublishResult;
}
