//! The blog pipeline: search, generate, optionally publish.
//!
//! One [`BlogPipeline`] serves every request variant. What differs between
//! them (which prompt template writes the copy, whether the result goes to the
//! CMS) is decided by the [`ContentGenerator`]'s resolved templates and by the
//! per-request publish flag, not by separate code paths.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::generator::ContentGenerator;
use crate::ports::{CmsPublisher, ProductSearch};
use crate::post_process;
use crate::{GeneratedPost, Keyword, PostDraft, PublishResult, ReviewedProduct, RunId};

/// Static knobs for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Products fetched when writing one combined post.
    pub post_search_limit: u32,
    /// Products fetched for per-product reviews when the caller gives no limit.
    pub default_review_limit: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            post_search_limit: 1,
            default_review_limit: 5,
        }
    }
}

/// Result of a successful generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOutcome {
    pub post: GeneratedPost,
    /// Present only when publishing was requested.
    pub publish: Option<PublishResult>,
}

/// Sequences product search, generation and publishing for one request.
#[derive(Clone)]
pub struct BlogPipeline {
    search: Arc<dyn ProductSearch>,
    generator: ContentGenerator,
    publisher: Arc<dyn CmsPublisher>,
    settings: PipelineSettings,
}

impl BlogPipeline {
    pub fn new(
        search: Arc<dyn ProductSearch>,
        generator: ContentGenerator,
        publisher: Arc<dyn CmsPublisher>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search,
            generator,
            publisher,
            settings,
        }
    }

    /// Writes one post about the top search results for `keyword`.
    ///
    /// Search and generation failures abort the run. When `publish` is set
    /// the post is also submitted as a CMS draft; a publish failure is
    /// reported in [`GenerateOutcome::publish`] and does not fail the run.
    #[instrument(skip_all, fields(run_id = %RunId::new_random(), keyword = keyword, publish = publish))]
    pub async fn generate_post(
        &self,
        keyword: &str,
        publish: bool,
    ) -> Result<GenerateOutcome, PipelineError> {
        let keyword = require_keyword(keyword)?;

        let products = self
            .search
            .search(&keyword, self.settings.post_search_limit)
            .await
            .inspect_err(|e| error!(error = %e, "product search failed"))?;
        info!(products = products.len(), "product search complete");

        let html = self
            .generator
            .generate(&products, &keyword)
            .await
            .inspect_err(|e| error!(error = %e, "blog post generation failed"))?;
        let post = GeneratedPost::from_html(html);

        let publish = if publish {
            Some(self.submit(None, &post.html, keyword).await)
        } else {
            None
        };

        Ok(GenerateOutcome { post, publish })
    }

    /// Submits existing HTML as a CMS draft.
    ///
    /// The title heading is always stripped from `content`; an explicit
    /// non-blank `title` replaces the extracted one. Only missing input is an
    /// error; CMS problems are reported in the returned result.
    #[instrument(skip_all, fields(run_id = %RunId::new_random(), keyword = keyword))]
    pub async fn publish_post(
        &self,
        title: Option<&str>,
        content: &str,
        keyword: &str,
    ) -> Result<PublishResult, PipelineError> {
        if content.trim().is_empty() {
            return Err(PipelineError::InvalidInput("content is required".to_string()));
        }
        let keyword = require_keyword(keyword)?;
        Ok(self.submit(title, content, keyword).await)
    }

    /// Searches for `keyword` and reviews each result concurrently.
    ///
    /// Search failures abort; individual review failures only blank that
    /// product's review.
    #[instrument(skip_all, fields(run_id = %RunId::new_random(), keyword = keyword))]
    pub async fn review_products(
        &self,
        keyword: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ReviewedProduct>, PipelineError> {
        let keyword = require_keyword(keyword)?;
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(self.settings.default_review_limit);

        let products = self
            .search
            .search(&keyword, limit)
            .await
            .inspect_err(|e| error!(error = %e, "product search failed"))?;

        let reviewed = self.generator.review_all(products, &keyword).await;
        let missing = reviewed.iter().filter(|r| r.review.is_none()).count();
        info!(products = reviewed.len(), missing_reviews = missing, "product reviews complete");
        Ok(reviewed)
    }

    async fn submit(&self, title: Option<&str>, content: &str, keyword: Keyword) -> PublishResult {
        let split = post_process::split(content);
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or(split.title);

        let draft = PostDraft {
            title,
            content: split.body,
            keyword,
        };
        let result = self.publisher.publish(&draft).await;
        if result.success {
            info!(post_id = ?result.post_id, "draft created");
        } else if !result.is_disabled() {
            warn!(error = ?result.error, "draft creation failed");
        }
        result
    }
}

fn require_keyword(raw: &str) -> Result<Keyword, PipelineError> {
    Keyword::new(raw).ok_or_else(|| PipelineError::InvalidInput("keyword is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{GenerationError, PublishError, SearchError};
    use crate::generator::DISCLOSURE_HTML;
    use crate::template::TemplateSource;
    use crate::testing::{RecordingPublisher, StubGenerator, StubSearch};
    use crate::Product;

    const STUB_HTML: &str = "<h1>마우스X 솔직 후기</h1>\n\n<p>정말 조용한 무선마우스예요.</p>";

    fn mouse() -> Product {
        Product {
            name: "마우스X".into(),
            price: 10000,
            ..Product::default()
        }
    }

    struct Harness {
        search: Arc<StubSearch>,
        text: Arc<StubGenerator>,
        publisher: Arc<RecordingPublisher>,
        pipeline: BlogPipeline,
    }

    fn harness(search: StubSearch, text: StubGenerator, publisher: RecordingPublisher) -> Harness {
        let search = Arc::new(search);
        let text = Arc::new(text);
        let publisher = Arc::new(publisher);
        let generator = ContentGenerator::new(
            text.clone(),
            &TemplateSource::builtin(),
            &TemplateSource::builtin(),
        );
        let pipeline = BlogPipeline::new(
            search.clone(),
            generator,
            publisher.clone(),
            PipelineSettings::default(),
        );
        Harness {
            search,
            text,
            publisher,
            pipeline,
        }
    }

    fn happy() -> Harness {
        harness(
            StubSearch::returning(vec![mouse()]),
            StubGenerator::replying(STUB_HTML),
            RecordingPublisher::accepting(11),
        )
    }

    #[tokio::test]
    async fn generates_without_touching_the_cms_by_default() {
        let h = happy();
        let outcome = h.pipeline.generate_post("무선마우스", false).await.unwrap();
        assert_eq!(outcome.post.html, format!("{STUB_HTML}{DISCLOSURE_HTML}"));
        assert_eq!(outcome.post.title, "마우스X 솔직 후기");
        assert!(outcome.publish.is_none());
        assert_eq!(h.publisher.calls(), 0);
        assert_eq!(h.search.calls(), vec![("무선마우스".to_string(), 1)]);
    }

    #[tokio::test]
    async fn publishing_strips_the_title_heading() {
        let h = happy();
        let outcome = h.pipeline.generate_post("무선마우스", true).await.unwrap();
        let publish = outcome.publish.unwrap();
        assert!(publish.success);

        let drafts = h.publisher.drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "마우스X 솔직 후기");
        assert!(!drafts[0].content.contains("<h1>"));
        assert!(drafts[0].content.starts_with("<p>정말 조용한"));
        assert!(drafts[0].content.contains("쿠팡 파트너스"));
        assert_eq!(drafts[0].keyword.as_str(), "무선마우스");
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_generation() {
        let h = harness(
            StubSearch::returning(vec![mouse()]),
            StubGenerator::replying(STUB_HTML),
            RecordingPublisher::answering(PublishResult::failed(&PublishError::Status {
                status: 401,
                body: "rest_cannot_create".into(),
            })),
        );
        let outcome = h.pipeline.generate_post("무선마우스", true).await.unwrap();
        let publish = outcome.publish.unwrap();
        assert!(!publish.success);
        assert!(publish.error.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn blank_keyword_is_invalid_input_and_calls_nothing() {
        let h = happy();
        let err = h.pipeline.generate_post("  ", false).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(h.search.calls().is_empty());
        assert!(h.text.requests().is_empty());
    }

    #[tokio::test]
    async fn search_failure_aborts_before_generation() {
        let h = harness(
            StubSearch::failing(401, "unauthorized"),
            StubGenerator::replying(STUB_HTML),
            RecordingPublisher::accepting(1),
        );
        let err = h.pipeline.generate_post("무선마우스", true).await.unwrap_err();
        assert!(matches!(err, PipelineError::Search(SearchError::Upstream(_))));
        assert!(err.to_string().contains("401"));
        assert!(h.text.requests().is_empty());
        assert_eq!(h.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn generation_failure_aborts_and_skips_publishing() {
        let h = harness(
            StubSearch::returning(vec![mouse()]),
            StubGenerator::failing("rate limited"),
            RecordingPublisher::accepting(1),
        );
        let err = h.pipeline.generate_post("무선마우스", true).await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::Generation(GenerationError::Provider("rate limited".into()))
        );
        assert_eq!(h.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn empty_search_result_is_a_generation_error() {
        let h = harness(
            StubSearch::returning(Vec::new()),
            StubGenerator::replying(STUB_HTML),
            RecordingPublisher::accepting(1),
        );
        let err = h.pipeline.generate_post("무선마우스", false).await.unwrap_err();
        assert_eq!(err, PipelineError::Generation(GenerationError::NoProducts));
    }

    #[tokio::test]
    async fn explicit_title_wins_and_heading_is_still_stripped() {
        let h = happy();
        let result = h
            .pipeline
            .publish_post(Some("내 제목"), STUB_HTML, "무선마우스")
            .await
            .unwrap();
        assert!(result.success);
        let draft = &h.publisher.drafts()[0];
        assert_eq!(draft.title, "내 제목");
        assert_eq!(draft.content, "<p>정말 조용한 무선마우스예요.</p>");
    }

    #[tokio::test]
    async fn publish_requires_content_and_keyword() {
        let h = happy();
        assert!(h
            .pipeline
            .publish_post(None, "", "무선마우스")
            .await
            .unwrap_err()
            .is_client_error());
        assert!(h
            .pipeline
            .publish_post(None, "<p>x</p>", "")
            .await
            .unwrap_err()
            .is_client_error());
        assert_eq!(h.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn reviews_use_the_default_limit_and_survive_failures() {
        let products = vec![
            Product {
                name: "Alpha".into(),
                ..Product::default()
            },
            Product {
                name: "Bravo".into(),
                ..Product::default()
            },
        ];
        let h = harness(
            StubSearch::returning(products),
            StubGenerator::replying("<h2>ok</h2>").failing_for("Alpha"),
            RecordingPublisher::accepting(1),
        );
        let reviewed = h.pipeline.review_products("무선마우스", None).await.unwrap();
        assert_eq!(h.search.calls(), vec![("무선마우스".to_string(), 5)]);
        assert_eq!(reviewed.len(), 2);
        assert_eq!(reviewed[0].review, None);
        assert_eq!(reviewed[1].review.as_deref(), Some("<h2>ok</h2>"));
    }
}
