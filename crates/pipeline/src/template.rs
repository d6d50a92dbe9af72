//! Prompt templates and placeholder rendering.
//!
//! A template is plain text with `{placeholder}` tokens. Which text is used for
//! a given [`TemplateKind`] is decided once, at startup, by [`TemplateSource`]:
//! an explicit override wins over a template file, which wins over the
//! built-in text compiled into this crate.

use crate::{Keyword, Product};

/// Every token [`PromptTemplate::render`] substitutes.
pub const PLACEHOLDERS: [&str; 9] = [
    "{name}",
    "{category}",
    "{price}",
    "{reviewCount}",
    "{keyword}",
    "{description}",
    "{image}",
    "{url}",
    "{products}",
];

/// What a template is used to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// One combined post about the search results.
    BlogPost,
    /// A short review of a single product.
    ProductReview,
}

impl TemplateKind {
    /// File name looked up in the prompt directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::BlogPost => "blog-post-prompt.txt",
            Self::ProductReview => "product-review-prompt.txt",
        }
    }

    /// Output token ceiling sized to what the template asks for.
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::BlogPost => 2000,
            Self::ProductReview => 1000,
        }
    }

    /// System-role framing sent alongside the rendered prompt.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::BlogPost => BLOG_POST_SYSTEM,
            Self::ProductReview => PRODUCT_REVIEW_SYSTEM,
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Self::BlogPost => BUILTIN_BLOG_POST,
            Self::ProductReview => BUILTIN_PRODUCT_REVIEW,
        }
    }
}

/// Where a resolved template's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Override,
    File,
    BuiltIn,
}

/// Candidate texts for one template kind, in priority order.
///
/// Blank candidates are ignored, so an empty override or an empty file falls
/// through to the next source.
#[derive(Debug, Clone, Default)]
pub struct TemplateSource {
    pub override_text: Option<String>,
    pub file_text: Option<String>,
}

impl TemplateSource {
    /// Always the built-in template.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Picks the highest-priority non-blank candidate for `kind`.
    pub fn resolve(&self, kind: TemplateKind) -> PromptTemplate {
        let usable = |text: &Option<String>| {
            text.as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
        };
        let (text, origin) = if let Some(text) = usable(&self.override_text) {
            (text, TemplateOrigin::Override)
        } else if let Some(text) = usable(&self.file_text) {
            (text, TemplateOrigin::File)
        } else {
            (kind.builtin().to_string(), TemplateOrigin::BuiltIn)
        };
        PromptTemplate { kind, text, origin }
    }
}

/// A resolved template, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    kind: TemplateKind,
    text: String,
    origin: TemplateOrigin,
}

impl PromptTemplate {
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitutes every placeholder occurrence in a single pass.
    ///
    /// Single-product placeholders take their values from the first product;
    /// `{products}` receives the whole list as pretty-printed JSON. Values are
    /// inserted verbatim and never rescanned, so a product description that
    /// happens to contain `{keyword}` is left as written.
    pub fn render(&self, products: &[Product], keyword: &Keyword) -> String {
        let fallback = Product::default();
        let first = products.first().unwrap_or(&fallback);
        let products_json =
            serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string());

        let value_for = |token: &str| -> Option<String> {
            Some(match token {
                "{name}" => first.name.clone(),
                "{category}" => first.category.clone(),
                "{price}" => first.display_price(),
                "{reviewCount}" => first.review_count.to_string(),
                "{keyword}" => keyword.as_str().to_string(),
                "{description}" => first.description.clone(),
                "{image}" => first.image.clone(),
                "{url}" => first.url.clone(),
                "{products}" => products_json.clone(),
                _ => return None,
            })
        };

        let mut out = String::with_capacity(self.text.len() + products_json.len());
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            let matched = PLACEHOLDERS
                .iter()
                .find(|token| candidate.starts_with(**token));
            match matched.and_then(|token| value_for(*token).map(|v| (token.len(), v))) {
                Some((len, value)) => {
                    out.push_str(&value);
                    rest = &candidate[len..];
                }
                None => {
                    out.push('{');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

// ---------------------------------------------------------------------------
// Built-in texts
// ---------------------------------------------------------------------------

const BLOG_POST_SYSTEM: &str = "당신은 전문 SEO 콘텐츠 작가입니다. 주어진 상품 정보로 검색에 잘 노출되는 \
블로그 포스팅을 HTML로 작성하고, 상품 이미지와 구매 링크를 반드시 포함하세요.";

const PRODUCT_REVIEW_SYSTEM: &str = "당신은 전문 SEO 콘텐츠 작가입니다. 상품 하나에 대한 짧고 \
신뢰감 있는 리뷰를 HTML 조각으로 작성하세요.";

const BUILTIN_BLOG_POST: &str = r#"키워드 "{keyword}"로 검색하는 독자를 위한 상품 리뷰 블로그 글을 HTML로 작성해줘.

[규칙]
- 글은 <article>로 감싸고, 맨 앞에는 제목 <h1>을 하나만 둬. 제목에는 상품명과 키워드를 모두 넣어.
- 소제목은 <h2 style="color:#346aff; font-weight:bold;">를 쓰고, 모든 소제목에 키워드를 자연스럽게 넣어.
- 본문 문단은 <p style="font-size:1.1em; line-height:1.6; color:#333;">로 작성해.
- 광고 문구처럼 들리지 않게, 실제 사용자의 말투로 써.
- 섹션 순서: 고른 이유, 써보고 좋았던 점, 아쉬운 점 한 가지, 총평과 추천 대상. 섹션마다 300자 이상.

[제목 아래 상품 카드]
<div style="display:flex; flex-wrap:wrap; align-items:center; margin-bottom:25px;">
  <a href="{url}" target="_blank" rel="noopener noreferrer">
    <img src="{image}" alt="{name}" style="max-width:300px; border-radius:12px; margin-right:24px;"/>
  </a>
  <div style="flex:1;">
    <div style="font-size:1.3em; color:#346aff; font-weight:bold;">{name}</div>
    <div style="color:#555;">카테고리: {category}</div>
    <div>가격: <strong style="color:#346aff;">{price}</strong></div>
    <a href="{url}" target="_blank" rel="noopener noreferrer">자세히 보기 &amp; 구매하기</a>
  </div>
</div>

[상품 정보]
{products}

[키워드]
{keyword}"#;

const BUILTIN_PRODUCT_REVIEW: &str = r#"아래 상품을 블로그 글에 넣을 2~3문장짜리 소개와 특징으로 정리해줘.

- <h2>{name}</h2>로 시작해.
- 특징은 <ul><li>로, 핵심 장점은 <strong>으로 강조해.
- 다른 상품과 겹치지 않는 관점으로, 실제 써본 사람처럼 짧게 써. 이모티콘은 자연스러울 때만.

상품명: {name}
카테고리: {category}
가격: {price}
리뷰 수: {reviewCount}
키워드: {keyword}
설명: {description}
이미지: {image}
링크: {url}"#;
