//! Process configuration, read once from the environment at startup.

use std::path::{Path, PathBuf};

use coupang::CoupangConfig;
use llm::OpenAiConfig;
use pipeline::{CategoryId, ConfigError, TemplateKind, TemplateSource};
use tracing::{debug, warn};
use wordpress::WordPressConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROMPT_DIR: &str = "prompts";
const DEFAULT_CATEGORY_ID: u64 = 1;

/// Everything the composition root needs, validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub coupang_access_key: String,
    pub coupang_secret_key: String,
    pub coupang: CoupangConfig,
    /// `None` disables publishing.
    pub wordpress: Option<WordPressConfig>,
    pub prompt_override: Option<String>,
    pub prompt_dir: PathBuf,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &str| get(name).ok_or_else(|| ConfigError::new(format!("{name} is not set")));

        let mut openai = OpenAiConfig::new(require("OPENAI_API_KEY")?);
        if let Some(model) = get("OPENAI_MODEL") {
            openai.model = model;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            openai.base_url = base_url;
        }

        let coupang_access_key = require("COUPANG_ACCESS_KEY")?;
        let coupang_secret_key = require("COUPANG_SECRET_KEY")?;
        let mut coupang = CoupangConfig {
            sub_id: get("COUPANG_SUB_ID"),
            ..CoupangConfig::default()
        };
        if let Some(base_url) = get("COUPANG_BASE_URL") {
            coupang.base_url = base_url;
        }

        let wordpress = match (get("WP_URL"), get("WP_USER"), get("WP_PASSWORD")) {
            (Some(base_url), Some(user), Some(password)) => Some(WordPressConfig {
                base_url,
                user,
                password,
                category_id: CategoryId::new(parse_or(
                    get("WP_CATEGORY_ID"),
                    "WP_CATEGORY_ID",
                    DEFAULT_CATEGORY_ID,
                )?),
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::new(
                    "WP_URL, WP_USER and WP_PASSWORD must be set together",
                ))
            }
        };

        Ok(Self {
            openai,
            coupang_access_key,
            coupang_secret_key,
            coupang,
            wordpress,
            prompt_override: get("PROMPT_OVERRIDE"),
            prompt_dir: get("PROMPT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_DIR)),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
        })
    }

    /// Template candidates for the blog post and the product review, in that
    /// order. The override applies to the blog post only.
    pub fn template_sources(&self) -> (TemplateSource, TemplateSource) {
        let post = TemplateSource {
            override_text: self.prompt_override.clone(),
            file_text: read_template(&self.prompt_dir, TemplateKind::BlogPost),
        };
        let review = TemplateSource {
            override_text: None,
            file_text: read_template(&self.prompt_dir, TemplateKind::ProductReview),
        };
        (post, review)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::new(format!("{name} is not a valid number: {raw}"))),
    }
}

fn read_template(dir: &Path, kind: TemplateKind) -> Option<String> {
    let path = dir.join(kind.file_name());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            debug!(path = %path.display(), "prompt template loaded");
            Some(text)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "prompt template unreadable; using built-in");
            None
        }
    }
}
