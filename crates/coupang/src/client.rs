use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};

use pipeline::{
    ConfigError, Keyword, Product, ProductSearch, RequestSigner, SearchError, UpstreamError,
};

use crate::schema::SearchResponse;

/// Production API gateway.
pub const DEFAULT_BASE_URL: &str = "https://api-gateway.coupang.com";

/// Signed path of the product search endpoint.
pub const SEARCH_PATH: &str = "/v2/providers/affiliate_open_api/apis/openapi/v1/products/search";

const SERVICE: &str = "Coupang";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `encodeURIComponent` set, plus `'`, which URL parsers would otherwise
/// re-encode after signing.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Connection settings for the affiliate API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoupangConfig {
    /// Scheme and host, without the API path.
    pub base_url: String,
    /// Optional `subId` channel tag attached to every search.
    pub sub_id: Option<String>,
}

impl Default for CoupangConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sub_id: None,
        }
    }
}

/// Product search over the signed affiliate API.
#[derive(Debug)]
pub struct CoupangClient {
    http: reqwest::Client,
    signer: RequestSigner,
    config: CoupangConfig,
}

impl CoupangClient {
    pub fn new(config: CoupangConfig, signer: RequestSigner) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::new(format!("cannot build affiliate HTTP client: {e}")))?;
        Ok(Self {
            http,
            signer,
            config,
        })
    }

    /// Path and query exactly as signed and sent.
    pub fn search_path(&self, keyword: &Keyword, limit: u32) -> String {
        let mut query = format!(
            "keyword={}",
            utf8_percent_encode(keyword.as_str(), QUERY_COMPONENT)
        );
        if let Some(sub_id) = self.config.sub_id.as_deref().filter(|s| !s.is_empty()) {
            query.push_str("&subId=");
            query.extend(utf8_percent_encode(sub_id, QUERY_COMPONENT));
        }
        query.push_str(&format!("&limit={limit}"));
        format!("{SEARCH_PATH}?{query}")
    }

    async fn fetch(&self, path_with_query: &str) -> Result<(u16, String), SearchError> {
        let authorization = self.signer.sign("GET", path_with_query)?;
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path_with_query
        );

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport(&e))?;
        debug!(status, bytes = body.len(), "affiliate search answered");
        Ok((status, body))
    }
}

#[async_trait]
impl ProductSearch for CoupangClient {
    #[instrument(skip(self), fields(keyword = %keyword))]
    async fn search(&self, keyword: &Keyword, limit: u32) -> Result<Vec<Product>, SearchError> {
        let path = self.search_path(keyword, limit);
        let (status, body) = self.fetch(&path).await?;

        if status != 200 || body.trim().is_empty() {
            warn!(status, "affiliate search rejected");
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body,
            }
            .into());
        }

        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            UpstreamError::Malformed {
                service: SERVICE,
                reason: format!("{e}: {body}"),
            }
        })?;

        let Some(raw) = parsed.data.and_then(|d| d.product_data) else {
            return Err(UpstreamError::Malformed {
                service: SERVICE,
                reason: format!(
                    "no data.productData (rCode={}, rMessage={})",
                    parsed.r_code.as_deref().unwrap_or("-"),
                    parsed.r_message.as_deref().unwrap_or("-")
                ),
            }
            .into());
        };

        let products: Vec<Product> = raw.into_iter().map(|p| p.into_product()).collect();
        info!(count = products.len(), "affiliate search complete");
        Ok(products)
    }
}

fn transport(e: &reqwest::Error) -> UpstreamError {
    let reason = if e.is_timeout() {
        format!("timed out after {}s: {e}", REQUEST_TIMEOUT.as_secs())
    } else {
        e.to_string()
    };
    UpstreamError::Transport {
        service: SERVICE,
        reason,
    }
}
