//! In-memory port doubles for tests.
//!
//! Available in this crate's own tests and, with the `test-helpers` feature,
//! to other crates:
//!
//! ```toml
//! [dev-dependencies]
//! pipeline = { workspace = true, features = ["test-helpers"] }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{GenerationError, SearchError, UpstreamError};
use crate::ports::{CmsPublisher, ProductSearch, TextGenerator};
use crate::{ChatRequest, Keyword, PostDraft, PostId, Product, PublishResult};

pub use crate::clock::FixedClock;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------

/// A [`ProductSearch`] that returns a canned answer and records its calls.
#[derive(Debug)]
pub struct StubSearch {
    result: Result<Vec<Product>, SearchError>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl StubSearch {
    pub fn returning(products: Vec<Product>) -> Self {
        Self {
            result: Ok(products),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with an upstream status error.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            result: Err(SearchError::Upstream(UpstreamError::Status {
                service: "Coupang",
                status,
                body: body.to_string(),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(keyword, limit)` for every call so far.
    pub fn calls(&self) -> Vec<(String, u32)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ProductSearch for StubSearch {
    async fn search(&self, keyword: &Keyword, limit: u32) -> Result<Vec<Product>, SearchError> {
        lock(&self.calls).push((keyword.as_str().to_string(), limit));
        self.result
            .clone()
            .map(|products| products.into_iter().take(limit as usize).collect())
    }
}

// ---------------------------------------------------------------------------

/// A [`TextGenerator`] that answers with fixed text and records every request.
#[derive(Debug)]
pub struct StubGenerator {
    reply: Result<String, String>,
    /// Requests whose user prompt contains this marker fail.
    fail_marker: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            fail_marker: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            fail_marker: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Makes only the requests mentioning `marker` fail.
    pub fn failing_for(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        lock(&self.requests).push(request.clone());
        if let Some(marker) = &self.fail_marker {
            if request.user.contains(marker.as_str()) {
                return Err(GenerationError::Provider(format!("stub failure for {marker}")));
            }
        }
        self.reply.clone().map_err(GenerationError::Provider)
    }
}

// ---------------------------------------------------------------------------

/// A [`CmsPublisher`] that records drafts and answers with a fixed result.
#[derive(Debug)]
pub struct RecordingPublisher {
    result: PublishResult,
    drafts: Mutex<Vec<PostDraft>>,
    calls: AtomicUsize,
}

impl RecordingPublisher {
    /// Accepts every draft as post `post_id`.
    pub fn accepting(post_id: u64) -> Self {
        Self::answering(PublishResult::published(
            PostId::new(post_id),
            Some(format!("https://blog.example/?p={post_id}")),
            "draft",
            None,
        ))
    }

    pub fn answering(result: PublishResult) -> Self {
        Self {
            result,
            drafts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn drafts(&self) -> Vec<PostDraft> {
        lock(&self.drafts).clone()
    }
}

#[async_trait]
impl CmsPublisher for RecordingPublisher {
    async fn publish(&self, draft: &PostDraft) -> PublishResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.drafts).push(draft.clone());
        self.result.clone()
    }
}
