//! Fake image host for testing
//!
//! This module provides a stub implementation of the remote fetcher that
//! returns predefined responses without making any network requests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mdimg_dl::fetcher::RemoteFetcher;

/// A fake image host that returns predefined responses for testing
pub struct FakeImageHost {
  images: Mutex<HashMap<String, (Vec<u8>, String)>>,
  failures: Mutex<HashMap<String, String>>,
}

impl FakeImageHost {
  /// Create a new fake host with no images
  pub fn new() -> Self {
    Self {
      images: Mutex::new(HashMap::new()),
      failures: Mutex::new(HashMap::new()),
    }
  }

  /// Create a fake host with a default set of sample images
  pub fn with_sample_images() -> Self {
    let host = Self::new();
    host.add_image("https://img.example.com/chart.png", b"png-data", "image/png");
    host.add_image("https://img.example.com/photo.jpg", b"jpg-data", "image/jpeg");
    host.add_image("https://img.example.com/anim", b"gif-data", "image/gif");
    host
  }

  /// Serve bytes and a content type for a URL
  pub fn add_image(&self, url: &str, bytes: &[u8], content_type: &str) {
    self
      .images
      .lock()
      .unwrap()
      .insert(url.to_string(), (bytes.to_vec(), content_type.to_string()));
  }

  /// Make a URL fail with the given error message
  pub fn add_failure(&self, url: &str, message: &str) {
    self.failures.lock().unwrap().insert(url.to_string(), message.to_string());
  }
}

impl Default for FakeImageHost {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl RemoteFetcher for FakeImageHost {
  async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
    if let Some(message) = self.failures.lock().unwrap().get(url) {
      return Err(anyhow!(message.clone()));
    }

    self
      .images
      .lock()
      .unwrap()
      .get(url)
      .map(|(bytes, _)| bytes.clone())
      .ok_or_else(|| anyhow!("connection refused fetching {url}"))
  }

  async fn fetch_content_type(&self, url: &str) -> String {
    self
      .images
      .lock()
      .unwrap()
      .get(url)
      .map(|(_, content_type)| content_type.clone())
      .unwrap_or_default()
  }
}
