//! HTTP retrieval of remote images.
//!
//! Downloads go out with browser-like headers because a bare client
//! User-Agent or a missing Referer gets rejected by origin-checking image
//! hosts. The fetcher is a trait so tests can substitute a fake that never
//! touches the network.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use url::Url;

/// Desktop Chrome User-Agent sent with every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

/// Accept header listing common image types.
const ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Trait for remote image retrieval (enables testing with fake
/// implementations).
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
  /// Download the raw bytes at `url`.
  ///
  /// # Errors
  /// Fails on transport errors and on any response status outside 2xx.
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

  /// Best-effort `Content-Type` lookup via a HEAD request.
  ///
  /// Returns an empty string on any failure; this call never errors.
  async fn fetch_content_type(&self, url: &str) -> String;
}

/// [`RemoteFetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  /// Build a fetcher with the given request timeout.
  pub fn new(timeout_secs: u64) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent(USER_AGENT)
      .build()
      .context("Failed to create HTTP client")?;

    Ok(Self { client })
  }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
    let response = self
      .client
      .get(url)
      .header("Accept", ACCEPT)
      .header("Accept-Language", ACCEPT_LANGUAGE)
      .header("Referer", referer_for(url))
      .send()
      .await
      .with_context(|| format!("Failed to request {url}"))?;

    let status = response.status();
    if !status.is_success() {
      return Err(anyhow!("HTTP error fetching {url}: status {status}"));
    }

    let bytes = response
      .bytes()
      .await
      .with_context(|| format!("Failed to read response body from {url}"))?;

    Ok(bytes.to_vec())
  }

  async fn fetch_content_type(&self, url: &str) -> String {
    let response = match self.client.head(url).send().await {
      Ok(response) => response,
      Err(_) => return String::new(),
    };

    response
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .unwrap_or("")
      .to_string()
  }
}

/// Derive the Referer header for a request: the URL's own origin.
///
/// Falls back to splitting on `/` and reassembling `scheme://host` when the
/// URL does not parse, and to the full URL when even that fails.
pub fn referer_for(url: &str) -> String {
  if let Ok(parsed) = Url::parse(url) {
    let origin = parsed.origin();
    if origin.is_tuple() {
      return origin.ascii_serialization();
    }
  }

  let parts: Vec<&str> = url.split('/').collect();
  if parts.len() >= 3 {
    return format!("{}//{}", parts[0], parts[2]);
  }

  url.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_referer_is_origin() {
    assert_eq!(referer_for("https://img.example.com/a/b.png?x=1"), "https://img.example.com");
  }

  #[test]
  fn test_referer_keeps_explicit_port() {
    assert_eq!(referer_for("http://localhost:8080/a.png"), "http://localhost:8080");
  }

  #[test]
  fn test_referer_fallback_split() {
    // Not a parseable URL, but still has scheme-ish and host-ish segments.
    assert_eq!(referer_for("https://exa mple.com/a.png"), "https://exa mple.com");
  }

  #[test]
  fn test_referer_fallback_full_url() {
    assert_eq!(referer_for("not-a-url"), "not-a-url");
  }

  #[test]
  fn test_http_fetcher_builds() {
    assert!(HttpFetcher::new(30).is_ok());
  }
}
