//! Draft submission over the WordPress REST API.
//!
//! Credentials are optional: without them the publisher reports a disabled
//! result. With them, the first image in the body becomes featured media when
//! it can, and the post is always filed as a draft.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use pipeline::{
    CategoryId, CmsPublisher, ConfigError, Keyword, MediaId, PostDraft, PostId, PublishError,
    PublishResult,
};

use crate::media;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DRAFT: &str = "draft";

/// Credentials and routing for one WordPress site.
#[derive(Clone, PartialEq, Eq)]
pub struct WordPressConfig {
    /// REST base, e.g. `https://blog.example/wp-json/wp/v2`.
    pub base_url: String,
    pub user: String,
    /// Application password.
    pub password: String,
    pub category_id: CategoryId,
}

impl std::fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("category_id", &self.category_id)
            .finish()
    }
}

impl WordPressConfig {
    pub(crate) fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url.trim_end_matches('/'))
    }
}

/// Post excerpt derived from the search keyword.
pub fn excerpt_for(keyword: &Keyword) -> String {
    format!("{keyword} 추천 상품 리뷰")
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    title: &'a str,
    content: &'a str,
    status: &'static str,
    categories: [CategoryId; 1],
    excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured_media: Option<MediaId>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: u64,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// [`CmsPublisher`] that files drafts through the WordPress REST API.
///
/// Built without a [`WordPressConfig`] it answers every call with
/// [`PublishResult::disabled`] and never touches the network.
#[derive(Debug)]
pub struct WordPressPublisher {
    http: reqwest::Client,
    config: Option<WordPressConfig>,
    /// Where downloaded images are staged before upload.
    staging_dir: PathBuf,
}

impl WordPressPublisher {
    pub fn new(config: Option<WordPressConfig>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::new(format!("cannot build CMS HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            staging_dir: std::env::temp_dir(),
        })
    }

    /// Stages downloaded images under `dir` instead of the system temp dir.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn featured_media(&self, config: &WordPressConfig, content: &str) -> Option<MediaId> {
        let src = media::first_image_src(content)?;
        match media::upload_featured_image(&self.http, config, &self.staging_dir, src).await {
            Ok(id) => {
                info!(media_id = %id, "featured image uploaded");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, src, "featured image skipped");
                None
            }
        }
    }

    async fn submit(
        &self,
        config: &WordPressConfig,
        draft: &PostDraft,
    ) -> Result<PublishResult, PublishError> {
        let featured_media = self.featured_media(config, &draft.content).await;
        let body = NewPost {
            title: &draft.title,
            content: &draft.content,
            status: DRAFT,
            categories: [config.category_id],
            excerpt: excerpt_for(&draft.keyword),
            featured_media,
        };

        let response = self
            .http
            .post(config.endpoint("posts"))
            .basic_auth(&config.user, Some(&config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(PublishError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let created: CreatedPost =
            serde_json::from_str(&text).map_err(|e| PublishError::Malformed(e.to_string()))?;
        Ok(PublishResult::published(
            PostId::new(created.id),
            created.link,
            created.status.unwrap_or_else(|| DRAFT.to_string()),
            featured_media,
        ))
    }
}

#[async_trait]
impl CmsPublisher for WordPressPublisher {
    #[instrument(skip_all, fields(keyword = %draft.keyword))]
    async fn publish(&self, draft: &PostDraft) -> PublishResult {
        let Some(config) = self.config.as_ref() else {
            info!("CMS not configured; skipping publish");
            return PublishResult::disabled();
        };
        match self.submit(config, draft).await {
            Ok(result) => {
                info!(post_id = ?result.post_id, "draft created");
                result
            }
            Err(e) => {
                warn!(error = %e, "draft creation failed");
                PublishResult::failed(&e)
            }
        }
    }
}
