//! Shared value types for the blog pipeline domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry the data
//! that flows between pipeline stages. All of them live for one pipeline run
//! only; nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PublishError;
use crate::{Keyword, MediaId, PostId};

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// A product returned by the affiliate search, in canonical form.
///
/// Produced by normalising the affiliate API's own schema; every optional
/// field defaults to empty/zero. Serialises with the camelCase field names
/// used in prompt templates and API responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Price in KRW. Zero when the upstream omitted it.
    pub price: u64,
    pub image: String,
    /// Affiliate (tracking) link for the product.
    pub url: String,
    pub description: String,
    pub category: String,
    pub rating: f64,
    pub review_count: u64,
}

impl Product {
    /// Price formatted for display in prompts: `"10000원"`, or `"-"` when unknown.
    pub fn display_price(&self) -> String {
        if self.price == 0 {
            "-".to_string()
        } else {
            format!("{}원", self.price)
        }
    }
}

/// A product paired with its independently generated review.
///
/// `review` is `None` when generation for this product failed; per-product
/// enrichment is best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "gptReview")]
    pub review: Option<String>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A provider-neutral chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System-role framing for the model.
    pub system: String,
    /// The rendered prompt, sent as the user message.
    pub user: String,
    pub temperature: f32,
    /// Output token ceiling.
    pub max_tokens: u32,
}

/// A generated blog post.
///
/// `html` is the model output followed by the disclosure fragment. `title` is
/// derived from `html` by [`crate::post_process::split`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub html: String,
    pub title: String,
}

impl GeneratedPost {
    /// Wraps generated HTML, deriving its title.
    pub fn from_html(html: String) -> Self {
        let title = crate::post_process::split(&html).title;
        Self { html, title }
    }
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Everything a CMS publisher needs to create one draft post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    /// Post body HTML with the title heading already stripped.
    pub content: String,
    pub keyword: Keyword,
}

/// Outcome of one publish attempt.
///
/// Publishing is best-effort relative to generation, so failures are carried in
/// this value instead of being raised. Serialises as
/// `{success, postId?, postUrl?, status?, error?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    /// Post status reported by the CMS (always `"draft"` on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<MediaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    disabled: bool,
}

impl PublishResult {
    /// A draft was created.
    pub fn published(
        post_id: PostId,
        post_url: Option<String>,
        status: impl Into<String>,
        featured_media: Option<MediaId>,
    ) -> Self {
        Self {
            success: true,
            post_id: Some(post_id),
            post_url,
            status: Some(status.into()),
            featured_media,
            error: None,
            disabled: false,
        }
    }

    /// The CMS rejected or never received the submission.
    pub fn failed(error: &PublishError) -> Self {
        Self {
            success: false,
            post_id: None,
            post_url: None,
            status: None,
            featured_media: None,
            error: Some(error.to_string()),
            disabled: false,
        }
    }

    /// Publishing is not configured; no call was attempted.
    pub fn disabled() -> Self {
        Self {
            success: false,
            post_id: None,
            post_url: None,
            status: None,
            featured_media: None,
            error: Some("WordPress publishing is not configured".to_string()),
            disabled: true,
        }
    }

    /// Returns `true` if this result came from an unconfigured publisher.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Formats as the compact `YYMMDD'T'HHmmss'Z'` form used in signed headers.
    pub fn to_signed_date(self) -> String {
        self.0.format("%y%m%dT%H%M%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
