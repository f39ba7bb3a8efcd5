//! File extension and file name resolution for downloaded images.
//!
//! Extensions come from the `Content-Type` header when the server sends a
//! usable one, then from the URL path, then fall back to `png`. File names
//! are generated from a user template with `{placeholder}` expansion.

use chrono::{DateTime, Datelike, Local, Timelike};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Image extensions the tool is willing to write to disk.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Length of the `{random}` token.
pub const RANDOM_TOKEN_LEN: usize = 10;

/// Derive a file extension from a URL and an optional MIME type.
///
/// Priority: `image/*` MIME subtype, then a trailing `.ext` in the URL path
/// (query string ignored), then `png`. `jpeg` is normalized to `jpg` and
/// anything outside [`SUPPORTED_EXTENSIONS`] is ignored.
pub fn resolve_extension(url: &str, mime_type: &str) -> String {
  if let Some(subtype) = mime_type.strip_prefix("image/") {
    let subtype = subtype.split(';').next().unwrap_or("").trim().to_lowercase();
    if SUPPORTED_EXTENSIONS.contains(&subtype.as_str()) {
      return normalize_jpeg(&subtype);
    }
  }

  let path = url.split(['?', '#']).next().unwrap_or(url);
  if let Some((_, ext)) = path.rsplit_once('.') {
    let ext = ext.to_lowercase();
    if !ext.contains('/') && SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
      return normalize_jpeg(&ext);
    }
  }

  "png".to_string()
}

fn normalize_jpeg(ext: &str) -> String {
  if ext == "jpeg" { "jpg".to_string() } else { ext.to_string() }
}

/// Generate a complete file name (`base.ext`) from a naming template.
///
/// See [`expand_template`] for the recognized placeholders. The `{random}`
/// token is freshly generated per call.
pub fn resolve_file_name(extension: &str, template: &str, note_base_name: &str, now: DateTime<Local>) -> String {
  let token = random_token();
  let base = expand_template(template, note_base_name, now, &token);
  format!("{base}.{extension}")
}

/// Expand naming placeholders and sanitize the result.
///
/// Recognized placeholders: `{notename}`, `{date}` (`YYYY-MM-DD`), `{time}`
/// (`HH-MM-SS`), `{datetime}`, `{timestamp}` (epoch milliseconds),
/// `{year}`/`{month}`/`{day}`/`{hour}`/`{minute}`/`{second}` (zero-padded),
/// and `{random}`. Unrecognized placeholders are left as literal text.
/// Filesystem-illegal characters and control characters in the expanded
/// result are replaced with `_`.
pub fn expand_template(template: &str, note_base_name: &str, now: DateTime<Local>, random_token: &str) -> String {
  let date = format!("{:04}-{:02}-{:02}", now.year(), now.month(), now.day());
  let time = format!("{:02}-{:02}-{:02}", now.hour(), now.minute(), now.second());

  let expanded = template
    .replace("{notename}", note_base_name)
    .replace("{datetime}", &format!("{date}_{time}"))
    .replace("{date}", &date)
    .replace("{time}", &time)
    .replace("{timestamp}", &now.timestamp_millis().to_string())
    .replace("{year}", &format!("{:04}", now.year()))
    .replace("{month}", &format!("{:02}", now.month()))
    .replace("{day}", &format!("{:02}", now.day()))
    .replace("{hour}", &format!("{:02}", now.hour()))
    .replace("{minute}", &format!("{:02}", now.minute()))
    .replace("{second}", &format!("{:02}", now.second()))
    .replace("{random}", random_token);

  sanitize_base_name(&expanded)
}

/// Replace characters that are illegal in file names with `_`.
fn sanitize_base_name(name: &str) -> String {
  name
    .chars()
    .map(|c| match c {
      '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
      c if c.is_control() => '_',
      c => c,
    })
    .collect()
}

fn random_token() -> String {
  rand::rng()
    .sample_iter(Alphanumeric)
    .take(RANDOM_TOKEN_LEN)
    .map(char::from)
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
  }

  #[test]
  fn test_extension_from_mime_type() {
    assert_eq!(resolve_extension("https://x/a", "image/png"), "png");
    assert_eq!(resolve_extension("https://x/a", "image/webp"), "webp");
  }

  #[test]
  fn test_extension_mime_jpeg_normalized() {
    assert_eq!(resolve_extension("https://x/a", "image/jpeg"), "jpg");
  }

  #[test]
  fn test_extension_mime_wins_over_url() {
    assert_eq!(resolve_extension("https://x/a.gif", "image/png"), "png");
  }

  #[test]
  fn test_extension_from_url_case_insensitive() {
    assert_eq!(resolve_extension("https://x/a.JPEG", ""), "jpg");
  }

  #[test]
  fn test_extension_from_url_ignores_query() {
    assert_eq!(resolve_extension("https://x/a.gif?size=large", ""), "gif");
  }

  #[test]
  fn test_extension_unsupported_falls_back_to_png() {
    assert_eq!(resolve_extension("https://x/a.exe", ""), "png");
    assert_eq!(resolve_extension("https://x/a", ""), "png");
    assert_eq!(resolve_extension("https://x/a", "text/html"), "png");
  }

  #[test]
  fn test_extension_unsupported_mime_falls_through_to_url() {
    assert_eq!(resolve_extension("https://x/a.bmp", "image/x-icon"), "bmp");
  }

  #[test]
  fn test_expand_template_placeholders() {
    let name = expand_template("{notename}_{date}_{time}", "daily", fixed_now(), "r4nd0mr4nd");
    assert_eq!(name, "daily_2024-03-07_09-05-02");
  }

  #[test]
  fn test_expand_template_individual_fields() {
    let name = expand_template("{year}{month}{day}-{hour}{minute}{second}", "n", fixed_now(), "x");
    assert_eq!(name, "20240307-090502");
  }

  #[test]
  fn test_expand_template_datetime_and_random() {
    let name = expand_template("{datetime}_{random}", "n", fixed_now(), "abc123def4");
    assert_eq!(name, "2024-03-07_09-05-02_abc123def4");
  }

  #[test]
  fn test_expand_template_timestamp_is_millis() {
    let now = fixed_now();
    let name = expand_template("{timestamp}", "n", now, "x");
    assert_eq!(name, now.timestamp_millis().to_string());
  }

  #[test]
  fn test_expand_template_unknown_placeholder_kept_literal() {
    let name = expand_template("{nope}_{date}", "n", fixed_now(), "x");
    assert_eq!(name, "{nope}_2024-03-07");
  }

  #[test]
  fn test_expand_template_sanitizes_illegal_characters() {
    let name = expand_template("a/b:c*d", "n", fixed_now(), "x");
    assert_eq!(name, "a_b_c_d");
  }

  #[test]
  fn test_expand_template_sanitizes_note_name() {
    // Illegal characters can arrive through the expanded note name too.
    let name = expand_template("{notename}", "what?now", fixed_now(), "x");
    assert_eq!(name, "what_now");
  }

  #[test]
  fn test_resolve_file_name_appends_extension() {
    let name = resolve_file_name("png", "{notename}", "note", fixed_now());
    assert_eq!(name, "note.png");
  }

  #[test]
  fn test_resolve_file_name_random_length() {
    let name = resolve_file_name("gif", "{random}", "note", fixed_now());
    assert_eq!(name.len(), RANDOM_TOKEN_LEN + ".gif".len());
    assert!(name.ends_with(".gif"));
  }
}
