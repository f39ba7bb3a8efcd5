//! Storage surface for a vault: a directory tree of Markdown notes.
//!
//! All public operations take vault-relative, forward-slash paths (the same
//! strings the path resolver produces) and translate them to OS paths
//! internally. Nothing here ever writes outside the vault root; callers
//! validate path safety before handing paths in.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tokio::fs;
use tracing::debug;

/// Handle to a vault rooted at a directory.
#[derive(Debug, Clone)]
pub struct Vault {
  root: PathBuf,
}

impl Vault {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Translate a vault-relative path to an OS path under the root.
  fn os_path(&self, relative: &str) -> PathBuf {
    let mut path = self.root.clone();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
      path.push(segment);
    }
    path
  }

  /// Whether a file or folder exists at the given vault-relative path.
  pub fn exists(&self, relative: &str) -> bool {
    self.os_path(relative).exists()
  }

  /// Create a folder, including missing parents. Idempotent: an existing
  /// folder is a no-op, and a creation failure that races with a concurrent
  /// creator is swallowed after an existence re-check.
  pub async fn create_folder(&self, relative: &str) -> Result<()> {
    let path = self.os_path(relative);
    if path.is_dir() {
      return Ok(());
    }

    match fs::create_dir_all(&path).await {
      Ok(()) => Ok(()),
      Err(error) => {
        if path.is_dir() {
          debug!("folder {} appeared concurrently, continuing", path.display());
          return Ok(());
        }
        Err(error).with_context(|| format!("Failed to create folder {}", path.display()))
      }
    }
  }

  /// Write binary content to a vault-relative path.
  pub async fn write_binary(&self, relative: &str, bytes: &[u8]) -> Result<()> {
    let path = self.os_path(relative);
    fs::write(&path, bytes)
      .await
      .with_context(|| format!("Failed to write file {}", path.display()))
  }

  /// Read a note's full text content.
  pub async fn read_note(&self, relative: &str) -> Result<String> {
    let path = self.os_path(relative);
    fs::read_to_string(&path)
      .await
      .with_context(|| format!("Failed to read note {}", path.display()))
  }

  /// Replace a note's full text content.
  pub async fn write_note(&self, relative: &str, content: &str) -> Result<()> {
    let path = self.os_path(relative);
    fs::write(&path, content)
      .await
      .with_context(|| format!("Failed to write note {}", path.display()))
  }

  /// Express an OS path as a vault-relative, forward-slash path.
  ///
  /// # Errors
  /// Fails if the path does not live under the vault root.
  pub fn relative_path_of(&self, path: &Path) -> Result<String> {
    let relative = path
      .strip_prefix(&self.root)
      .map_err(|_| anyhow!("{} is not inside the vault {}", path.display(), self.root.display()))?;

    let segments: Vec<String> = relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy().into_owned())
      .collect();
    Ok(segments.join("/"))
  }
}
