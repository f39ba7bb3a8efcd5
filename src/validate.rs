//! Input validation and sanitization.
//!
//! Everything that ends up on disk or in a request passes through here
//! first: URLs before a download is attempted, file and folder names before
//! a write, user-supplied paths and naming templates when settings change.

use url::Url;

/// Characters Windows refuses in file and folder names.
const ILLEGAL_NAME_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Windows reserved device names (case-insensitive, extension ignored).
const RESERVED_NAMES: [&str; 22] = [
  "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1", "LPT2",
  "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validate a remote image URL before any request is made.
pub fn validate_url(url: &str) -> Result<(), String> {
  if url.trim().is_empty() {
    return Err("URL must not be empty".to_string());
  }

  if !url.starts_with("http://") && !url.starts_with("https://") {
    return Err("URL must start with http:// or https://".to_string());
  }

  Url::parse(url).map_err(|e| format!("Invalid URL: {e}"))?;

  Ok(())
}

/// Validate a generated file name before writing.
pub fn validate_file_name(file_name: &str) -> Result<(), String> {
  if file_name.trim().is_empty() {
    return Err("File name must not be empty".to_string());
  }

  if file_name.len() > 255 {
    return Err("File name too long (255 characters max)".to_string());
  }

  if file_name.chars().any(|c| ILLEGAL_NAME_CHARS.contains(&c) || c.is_control()) {
    return Err("File name contains illegal characters".to_string());
  }

  let base = file_name.split('.').next().unwrap_or("").to_uppercase();
  if RESERVED_NAMES.contains(&base.as_str()) {
    return Err("File name is a reserved system name".to_string());
  }

  Ok(())
}

/// Validate a user-configured folder name.
pub fn validate_folder_name(folder_name: &str) -> Result<(), String> {
  if folder_name.trim().is_empty() {
    return Err("Folder name must not be empty".to_string());
  }

  if folder_name.len() > 255 {
    return Err("Folder name too long (255 characters max)".to_string());
  }

  if folder_name.chars().any(|c| ILLEGAL_NAME_CHARS.contains(&c) || c.is_control()) {
    return Err("Folder name contains illegal characters".to_string());
  }

  if folder_name.contains("..") || folder_name.starts_with('/') || folder_name.starts_with('\\') {
    return Err("Folder name must not traverse outside the vault".to_string());
  }

  Ok(())
}

/// Reject resolved paths that would escape the vault.
pub fn validate_path_safety(path: &str) -> Result<(), String> {
  if path.trim().is_empty() {
    return Err("Path must not be empty".to_string());
  }

  if path.contains("../") || path.contains("..\\") {
    return Err("Path contains unsafe traversal segments".to_string());
  }

  if path.starts_with("./") || path.starts_with(".\\") {
    return Err("Path must not start with a relative prefix".to_string());
  }

  Ok(())
}

/// Validate a naming template: length bounds and recognized placeholders
/// only. Literal text between placeholders is always allowed.
pub fn validate_naming_format(format: &str) -> Result<(), String> {
  const ALLOWED: [&str; 12] = [
    "{notename}",
    "{date}",
    "{time}",
    "{datetime}",
    "{timestamp}",
    "{year}",
    "{month}",
    "{day}",
    "{hour}",
    "{minute}",
    "{second}",
    "{random}",
  ];

  if format.trim().is_empty() {
    return Err("Naming format must not be empty".to_string());
  }

  if format.len() > 200 {
    return Err("Naming format too long (200 characters max)".to_string());
  }

  let mut rest = format;
  while let Some(open) = rest.find('{') {
    let Some(close) = rest[open..].find('}') else {
      break;
    };
    let placeholder = &rest[open..open + close + 1];
    if !ALLOWED.contains(&placeholder) {
      return Err(format!("Unsupported placeholder: {placeholder}"));
    }
    rest = &rest[open + close + 1..];
  }

  Ok(())
}

/// Clean a user-supplied vault-relative path: strip illegal characters,
/// collapse duplicate slashes, and drop leading relative prefixes. An empty
/// result falls back to `assets`.
pub fn sanitize_path(path: &str) -> String {
  let mut cleaned: String = path
    .trim()
    .chars()
    .map(|c| if ILLEGAL_NAME_CHARS.contains(&c) { '_' } else { c })
    .collect();

  while cleaned.contains("//") {
    cleaned = cleaned.replace("//", "/");
  }
  while cleaned.contains("\\\\") {
    cleaned = cleaned.replace("\\\\", "\\");
  }

  loop {
    let stripped = cleaned
      .strip_prefix("./")
      .or_else(|| cleaned.strip_prefix("../"))
      .or_else(|| cleaned.strip_prefix(".\\"))
      .or_else(|| cleaned.strip_prefix("..\\"));
    match stripped {
      Some(rest) => cleaned = rest.to_string(),
      None => break,
    }
  }

  if cleaned.is_empty() { "assets".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate_url_accepts_http_and_https() {
    assert!(validate_url("http://example.com/a.png").is_ok());
    assert!(validate_url("https://example.com/a.png").is_ok());
  }

  #[test]
  fn test_validate_url_rejects_empty_and_schemes() {
    assert!(validate_url("").is_err());
    assert!(validate_url("   ").is_err());
    assert!(validate_url("ftp://example.com/a.png").is_err());
    assert!(validate_url("example.com/a.png").is_err());
  }

  #[test]
  fn test_validate_url_rejects_unparseable() {
    assert!(validate_url("https://").is_err());
  }

  #[test]
  fn test_validate_file_name() {
    assert!(validate_file_name("note_2024-03-07.png").is_ok());
    assert!(validate_file_name("").is_err());
    assert!(validate_file_name("a?b.png").is_err());
    assert!(validate_file_name(&"x".repeat(256)).is_err());
  }

  #[test]
  fn test_validate_file_name_reserved() {
    assert!(validate_file_name("CON.png").is_err());
    assert!(validate_file_name("con.png").is_err());
    assert!(validate_file_name("lpt3.gif").is_err());
    assert!(validate_file_name("console.png").is_ok());
  }

  #[test]
  fn test_validate_folder_name() {
    assert!(validate_folder_name("assets").is_ok());
    assert!(validate_folder_name("notes/media").is_ok());
    assert!(validate_folder_name("").is_err());
    assert!(validate_folder_name("..").is_err());
    assert!(validate_folder_name("/abs").is_err());
    assert!(validate_folder_name("a|b").is_err());
  }

  #[test]
  fn test_validate_path_safety() {
    assert!(validate_path_safety("notes/assets/a.png").is_ok());
    assert!(validate_path_safety("../outside/a.png").is_err());
    assert!(validate_path_safety("notes/../../a.png").is_err());
    assert!(validate_path_safety("./a.png").is_err());
    assert!(validate_path_safety("").is_err());
  }

  #[test]
  fn test_validate_naming_format() {
    assert!(validate_naming_format("{notename}_{date}_{time}").is_ok());
    assert!(validate_naming_format("img-{random}").is_ok());
    assert!(validate_naming_format("plain-literal").is_ok());
    assert!(validate_naming_format("").is_err());
    assert!(validate_naming_format("{bogus}").is_err());
    assert!(validate_naming_format(&"{date}".repeat(50)).is_err());
  }

  #[test]
  fn test_sanitize_path() {
    assert_eq!(sanitize_path("  assets "), "assets");
    assert_eq!(sanitize_path("a//b///c"), "a/b/c");
    assert_eq!(sanitize_path("../../escape"), "escape");
    assert_eq!(sanitize_path("./rel"), "rel");
    assert_eq!(sanitize_path("a<b>c"), "a_b_c");
    assert_eq!(sanitize_path(""), "assets");
  }
}
