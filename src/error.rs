//! Error classification for user-facing reporting.
//!
//! Failures inside the per-image pipeline are propagated as `anyhow` errors
//! and classified at the reference boundary so the user sees one short,
//! stable message per failure. Classification by keyword is a best-effort
//! heuristic over the error text, not a contract to branch on.

use thiserror::Error;

/// Broad failure categories for one image's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Transport failure or non-2xx response.
  Network,
  /// Create/write failure not explained by a benign "already exists".
  File,
  /// Filesystem or remote permission problem.
  Permission,
  /// Malformed URL or disallowed scheme.
  Url,
  /// Anything that did not match a known category.
  Unknown,
}

impl ErrorKind {
  /// Short user-facing message for a notice line.
  pub fn user_message(self) -> &'static str {
    match self {
      ErrorKind::Network => "network error, check the connection",
      ErrorKind::File => "file operation failed, check permissions",
      ErrorKind::Permission => "permission denied",
      ErrorKind::Url => "image URL is malformed",
      ErrorKind::Unknown => "operation failed, run with -v for details",
    }
  }
}

/// Structured errors raised by the processor itself (as opposed to errors
/// bubbling up from I/O, which stay `anyhow` and get classified by text).
#[derive(Debug, Error)]
pub enum ProcessError {
  /// A run was requested while another one is still active.
  #[error("another run is already in progress")]
  Busy,
  /// The downloaded response body was empty.
  #[error("downloaded image from {url} is empty")]
  EmptyDownload { url: String },
}

/// Classify an error message into an [`ErrorKind`] by keyword matching.
///
/// Categories are checked in a fixed order (network, file, permission, URL)
/// so that messages matching several groups land in the earliest one.
pub fn classify(message: &str) -> ErrorKind {
  let lower = message.to_lowercase();

  let network = ["network", "fetch", "http", "timeout", "connection", "dns", "enotfound"];
  if network.iter().any(|k| lower.contains(k)) {
    return ErrorKind::Network;
  }

  let file = ["enoent", "eacces", "file", "folder", "directory", "no such"];
  if file.iter().any(|k| lower.contains(k)) {
    return ErrorKind::File;
  }

  let permission = ["permission", "unauthorized", "forbidden", "denied"];
  if permission.iter().any(|k| lower.contains(k)) {
    return ErrorKind::Permission;
  }

  let url = ["invalid url", "malformed", "url"];
  if url.iter().any(|k| lower.contains(k)) {
    return ErrorKind::Url;
  }

  ErrorKind::Unknown
}

/// Classify an `anyhow` error chain, considering every message in the chain.
pub fn classify_error(error: &anyhow::Error) -> ErrorKind {
  for cause in error.chain() {
    let kind = classify(&cause.to_string());
    if kind != ErrorKind::Unknown {
      return kind;
    }
  }
  ErrorKind::Unknown
}

#[cfg(test)]
mod tests {
  use anyhow::{Context, anyhow};

  use super::*;

  #[test]
  fn test_classify_network_messages() {
    assert_eq!(classify("HTTP error! status: 503"), ErrorKind::Network);
    assert_eq!(classify("connection refused"), ErrorKind::Network);
    assert_eq!(classify("operation timeout"), ErrorKind::Network);
  }

  #[test]
  fn test_classify_file_messages() {
    assert_eq!(classify("ENOENT: no such file"), ErrorKind::File);
    assert_eq!(classify("failed to create folder"), ErrorKind::File);
  }

  #[test]
  fn test_classify_permission_messages() {
    assert_eq!(classify("permission denied (os error 13)"), ErrorKind::Permission);
  }

  #[test]
  fn test_classify_url_messages() {
    assert_eq!(classify("invalid URL scheme"), ErrorKind::Url);
  }

  #[test]
  fn test_classify_order_network_first() {
    // Mentions both "http" and "file"; network wins by order.
    assert_eq!(classify("http request for file failed"), ErrorKind::Network);
  }

  #[test]
  fn test_classify_unknown() {
    assert_eq!(classify("something odd happened"), ErrorKind::Unknown);
  }

  #[test]
  fn test_classify_error_walks_chain() {
    let error = anyhow!("connection reset by peer").context("saving image");
    assert_eq!(classify_error(&error), ErrorKind::Network);
  }

  #[test]
  fn test_process_error_messages() {
    assert_eq!(ProcessError::Busy.to_string(), "another run is already in progress");
    assert!(
      ProcessError::EmptyDownload {
        url: "https://x/a.png".to_string()
      }
      .to_string()
      .contains("https://x/a.png")
    );
  }
}
