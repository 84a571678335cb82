//! Reading adapter sources from disk or over HTTP.

use std::{path::Path, time::Duration};

use reqwest::StatusCode;

use crate::foundation::error::{ReelError, ReelResult};

/// Largest accepted source document, in bytes.
pub const MAX_SOURCE_BYTES: u64 = 10_000_000;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BINARY_SIGNATURES: [(&[u8], &str); 6] = [
    (b"\xff\xd8\xff", "JPEG image"),
    (b"\x89PNG", "PNG image"),
    (b"GIF8", "GIF image"),
    (b"%PDF", "PDF document"),
    (b"PK\x03\x04", "ZIP archive"),
    (b"\x00\x00\x00", "binary media"),
];

/// `true` for `http://` and `https://` sources.
pub fn is_url(source: &str) -> bool {
    let s = source.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// Point GitHub `blob` page URLs at the raw file.
pub fn rewrite_github_url(url: &str) -> String {
    if url.contains("github.com") && url.contains("/blob/") {
        url.replacen("github.com", "raw.githubusercontent.com", 1)
            .replacen("/blob/", "/", 1)
    } else {
        url.to_string()
    }
}

/// Read a UTF-8 text source from disk.
///
/// A missing file is `SourceNotFound`; directories, oversized and binary files are
/// `StructureError`s.
pub async fn read_text_file(path: &Path) -> ReelResult<String> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReelError::source_not_found(format!(
                "file not found: {}",
                path.display()
            )));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("stat '{}'", path.display()))
                .into());
        }
    };
    if !meta.is_file() {
        return Err(ReelError::structure(format!(
            "not a file: {}",
            path.display()
        )));
    }
    if meta.len() > MAX_SOURCE_BYTES {
        return Err(ReelError::structure(format!(
            "file too large: {} bytes (max {MAX_SOURCE_BYTES})",
            meta.len()
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::Error::new(e).context(format!("read '{}'", path.display())))?;
    if let Some((_, kind)) = BINARY_SIGNATURES
        .iter()
        .find(|(sig, _)| bytes.starts_with(sig))
    {
        return Err(ReelError::structure(format!(
            "{} looks like a {kind}, expected a text document",
            path.display()
        )));
    }
    String::from_utf8(bytes).map_err(|e| {
        ReelError::structure(format!("{} is not valid UTF-8: {e}", path.display()))
    })
}

/// Fetch a text document over HTTP(S).
///
/// 404 is `SourceNotFound`; transport failures and other non-success statuses are
/// `CollaboratorUnavailable` so the input stage may retry them.
#[tracing::instrument(level = "debug")]
pub async fn fetch_url(url: &str) -> ReelResult<String> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| ReelError::structure(format!("invalid URL '{url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ReelError::structure(format!(
                "unsupported URL scheme '{scheme}' (only http/https)"
            )));
        }
    }
    let target = rewrite_github_url(parsed.as_str());

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| ReelError::unavailable(format!("failed to create HTTP client: {e}")))?;
    let response = client
        .get(&target)
        .send()
        .await
        .map_err(|e| ReelError::unavailable(format!("fetch '{target}': {e}")))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ReelError::source_not_found(format!("{target} returned 404")));
    }
    if !status.is_success() {
        return Err(ReelError::unavailable(format!("{target} returned {status}")));
    }
    if let Some(len) = response.content_length()
        && len > MAX_SOURCE_BYTES
    {
        return Err(ReelError::structure(format!(
            "document too large: {len} bytes (max {MAX_SOURCE_BYTES})"
        )));
    }
    let text = response
        .text()
        .await
        .map_err(|e| ReelError::unavailable(format!("read body of '{target}': {e}")))?;
    if text.len() as u64 > MAX_SOURCE_BYTES {
        return Err(ReelError::structure(format!(
            "document too large: {} bytes (max {MAX_SOURCE_BYTES})",
            text.len()
        )));
    }
    tracing::debug!(bytes = text.len(), "fetched document");
    Ok(text)
}
