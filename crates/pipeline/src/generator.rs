//! Content generation: prompt rendering plus one text-provider call per post.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::errors::GenerationError;
use crate::ports::TextGenerator;
use crate::template::{PromptTemplate, TemplateKind, TemplateSource};
use crate::{ChatRequest, Keyword, Product, ReviewedProduct};

/// Sampling temperature for every generation call.
pub const TEMPERATURE: f32 = 0.7;

/// Affiliate disclosure appended to every generated post.
pub const DISCLOSURE_HTML: &str = r#"
<div class="affiliate-disclosure" style="margin-top:20px; padding:15px; background-color:#f8f9fa; border:1px solid #dee2e6; border-radius:4px; font-size:14px; color:#666; text-align:center;">
  <img src="https://static.coupangcdn.com/image/coupang/common/logo_coupang_w350.png" alt="쿠팡" style="max-width:200px; margin-bottom:8px;">
  <div>이 포스팅은 쿠팡 파트너스 활동의 일환으로, 이에 따른 일정액의 수수료를 제공받습니다.</div>
</div>"#;

/// Writes blog posts and product reviews through a [`TextGenerator`].
///
/// Templates are resolved once at construction and never re-read.
#[derive(Clone)]
pub struct ContentGenerator {
    provider: Arc<dyn TextGenerator>,
    post_template: PromptTemplate,
    review_template: PromptTemplate,
}

impl ContentGenerator {
    pub fn new(
        provider: Arc<dyn TextGenerator>,
        post_source: &TemplateSource,
        review_source: &TemplateSource,
    ) -> Self {
        let post_template = post_source.resolve(TemplateKind::BlogPost);
        let review_template = review_source.resolve(TemplateKind::ProductReview);
        info!(
            post_template = ?post_template.origin(),
            review_template = ?review_template.origin(),
            "prompt templates resolved"
        );
        Self {
            provider,
            post_template,
            review_template,
        }
    }

    /// Writes one post covering `products` and appends the disclosure.
    ///
    /// Any provider failure is returned as-is; there is no retry and no
    /// partial output.
    #[instrument(skip(self, products), fields(products = products.len(), keyword = %keyword))]
    pub async fn generate(
        &self,
        products: &[Product],
        keyword: &Keyword,
    ) -> Result<String, GenerationError> {
        if products.is_empty() {
            return Err(GenerationError::NoProducts);
        }
        let request = chat_request(&self.post_template, products, keyword);
        let html = self.provider.complete(&request).await?;
        if html.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        info!(chars = html.len(), "blog post generated");
        Ok(format!("{html}{DISCLOSURE_HTML}"))
    }

    /// Writes a short review of one product.
    #[instrument(skip(self, product), fields(product = %product.name))]
    pub async fn review(
        &self,
        product: &Product,
        keyword: &Keyword,
    ) -> Result<String, GenerationError> {
        let request = chat_request(
            &self.review_template,
            std::slice::from_ref(product),
            keyword,
        );
        let text = self.provider.complete(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    /// Reviews every product concurrently.
    ///
    /// Best-effort: a failed review leaves that product's `review` empty and
    /// does not affect the others. Output order matches `products`.
    pub async fn review_all(&self, products: Vec<Product>, keyword: &Keyword) -> Vec<ReviewedProduct> {
        let reviews = join_all(products.iter().map(|p| self.review(p, keyword))).await;
        products
            .into_iter()
            .zip(reviews)
            .map(|(product, review)| {
                let review = match review {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(product = %product.name, error = %e, "product review skipped");
                        None
                    }
                };
                ReviewedProduct { product, review }
            })
            .collect()
    }
}

fn chat_request(template: &PromptTemplate, products: &[Product], keyword: &Keyword) -> ChatRequest {
    let kind = template.kind();
    ChatRequest {
        system: kind.system_prompt().to_string(),
        user: template.render(products, keyword),
        temperature: TEMPERATURE,
        max_tokens: kind.max_tokens(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubGenerator;

    fn product(name: &str) -> Product {
        Product {
            name: name.into(),
            price: 10000,
            ..Product::default()
        }
    }

    fn keyword() -> Keyword {
        Keyword::new("무선마우스").unwrap()
    }

    fn generator(stub: &Arc<StubGenerator>) -> ContentGenerator {
        ContentGenerator::new(
            stub.clone(),
            &TemplateSource::builtin(),
            &TemplateSource::builtin(),
        )
    }

    #[tokio::test]
    async fn post_is_model_output_plus_disclosure() {
        let stub = Arc::new(StubGenerator::replying("<h1>마우스X 후기</h1><p>좋음</p>"));
        let html = generator(&stub)
            .generate(&[product("마우스X")], &keyword())
            .await
            .unwrap();
        assert_eq!(html, format!("<h1>마우스X 후기</h1><p>좋음</p>{DISCLOSURE_HTML}"));
    }

    #[tokio::test]
    async fn post_request_uses_fixed_framing_and_bounds() {
        let stub = Arc::new(StubGenerator::replying("<p>x</p>"));
        generator(&stub)
            .generate(&[product("마우스X")], &keyword())
            .await
            .unwrap();
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.system.contains("SEO"));
        assert_eq!(request.temperature, TEMPERATURE);
        assert_eq!(request.max_tokens, 2000);
        assert!(request.user.contains("마우스X"));
        assert!(request.user.contains("무선마우스"));
        assert!(!request.user.contains("{products}"));
    }

    #[tokio::test]
    async fn override_template_is_used_for_posts() {
        let stub = Arc::new(StubGenerator::replying("<p>x</p>"));
        let generator = ContentGenerator::new(
            stub.clone(),
            &TemplateSource {
                override_text: Some("write about {name} for {keyword}".into()),
                file_text: Some("ignored".into()),
            },
            &TemplateSource::builtin(),
        );
        generator.generate(&[product("마우스X")], &keyword()).await.unwrap();
        assert_eq!(stub.requests()[0].user, "write about 마우스X for 무선마우스");
    }

    #[tokio::test]
    async fn provider_failure_is_propagated() {
        let stub = Arc::new(StubGenerator::failing("quota exceeded"));
        let err = generator(&stub)
            .generate(&[product("마우스X")], &keyword())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Provider("quota exceeded".into()));
    }

    #[tokio::test]
    async fn empty_inputs_and_outputs_are_errors() {
        let stub = Arc::new(StubGenerator::replying("   "));
        let generator = generator(&stub);
        assert_eq!(
            generator.generate(&[], &keyword()).await.unwrap_err(),
            GenerationError::NoProducts
        );
        assert!(stub.requests().is_empty());
        assert_eq!(
            generator
                .generate(&[product("마우스X")], &keyword())
                .await
                .unwrap_err(),
            GenerationError::EmptyResponse
        );
    }

    #[tokio::test]
    async fn reviews_are_best_effort_and_keep_input_order() {
        let stub = Arc::new(StubGenerator::replying("  <h2>review</h2>  ").failing_for("Bravo"));
        let reviewed = generator(&stub)
            .review_all(
                vec![product("Alpha"), product("Bravo"), product("Charlie")],
                &keyword(),
            )
            .await;
        let names: Vec<_> = reviewed.iter().map(|r| r.product.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
        assert_eq!(reviewed[0].review.as_deref(), Some("<h2>review</h2>"));
        assert_eq!(reviewed[1].review, None);
        assert_eq!(reviewed[2].review.as_deref(), Some("<h2>review</h2>"));
        assert!(stub.requests().iter().all(|r| r.max_tokens == 1000));
    }
}
