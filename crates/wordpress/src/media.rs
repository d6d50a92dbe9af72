//! Featured image handling: find, download, stage, upload.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use pipeline::{MediaId, PublishError};

use crate::publisher::WordPressConfig;

static IMG_SRC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).ok());

const FALLBACK_FILE_NAME: &str = "featured-image";

#[derive(Debug, Deserialize)]
struct UploadedMedia {
    id: u64,
}

/// `src` of the first `<img>` element in `html`.
pub(crate) fn first_image_src(html: &str) -> Option<&str> {
    IMG_SRC
        .as_ref()?
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Last path segment of an image URL, without its query or fragment.
pub(crate) fn file_name_of(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && s.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// Prefix of every staged image file.
pub(crate) const STAGED_PREFIX: &str = "partners-blog-";

/// Downloads `src`, stages it in a temporary file under `staging_dir` and
/// uploads it to `<wp>/media`. The temporary file is removed when this
/// returns, on every path.
pub(crate) async fn upload_featured_image(
    http: &reqwest::Client,
    config: &WordPressConfig,
    staging_dir: &Path,
    src: &str,
) -> Result<MediaId, PublishError> {
    let response = http
        .get(src)
        .send()
        .await
        .map_err(|e| PublishError::Transport(format!("image download: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PublishError::Status {
            status: status.as_u16(),
            body: format!("image download from {src}"),
        });
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PublishError::Transport(format!("image download: {e}")))?;

    let staged = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .tempfile_in(staging_dir)
        .map_err(|e| PublishError::Transport(format!("temporary file: {e}")))?;
    tokio::fs::write(staged.path(), &bytes)
        .await
        .map_err(|e| PublishError::Transport(format!("temporary file: {e}")))?;
    let data = tokio::fs::read(staged.path())
        .await
        .map_err(|e| PublishError::Transport(format!("temporary file: {e}")))?;
    debug!(bytes = data.len(), path = %staged.path().display(), "image staged");

    let part = Part::bytes(data)
        .file_name(file_name_of(src))
        .mime_str(&content_type)
        .map_err(|e| PublishError::Transport(format!("image content type: {e}")))?;
    let form = Form::new().part("file", part);

    let response = http
        .post(config.endpoint("media"))
        .basic_auth(&config.user, Some(&config.password))
        .multipart(form)
        .send()
        .await
        .map_err(|e| PublishError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PublishError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(PublishError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let uploaded: UploadedMedia =
        serde_json::from_str(&body).map_err(|e| PublishError::Malformed(e.to_string()))?;
    Ok(MediaId::new(uploaded.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_first_image_source() {
        let html = r#"<p>intro</p><IMG alt="x" SRC='https://img.example/a.png'><img src="https://img.example/b.png">"#;
        assert_eq!(first_image_src(html), Some("https://img.example/a.png"));
    }

    #[test]
    fn no_image_means_no_source() {
        assert_eq!(first_image_src("<p>text only</p>"), None);
        assert_eq!(first_image_src(r#"<img src="">"#), None);
        assert_eq!(first_image_src(r#"<imgx src="a.png">"#), None);
    }

    #[test]
    fn file_name_drops_query_and_falls_back() {
        assert_eq!(file_name_of("https://img.example/p/x.png?w=300"), "x.png");
        assert_eq!(file_name_of("https://img.example/thumb/"), FALLBACK_FILE_NAME);
        assert_eq!(file_name_of("https://img.example/raw"), FALLBACK_FILE_NAME);
    }
}
