//! Rewriting note content to point image links at local copies.
//!
//! Replacements change the length of the string, so applying several of them
//! is only safe against offsets taken from the original snapshot when the
//! spans are spliced right-to-left. `rewrite_all` enforces that ordering with
//! an explicit sort; callers splicing one reference at a time (the processor
//! does, so each success lands in the note immediately) must iterate in the
//! same descending-offset order.

use crate::scanner::ImageReference;

/// Render the canonical local image construct. Original alt text is
/// intentionally discarded.
pub fn local_image_link(local_path: &str) -> String {
  format!("![]({local_path})")
}

/// Replace a single reference span with a local image link.
///
/// The reference offsets must come from a scan of `content` itself; splicing
/// with stale offsets would corrupt the note.
pub fn replace_reference(content: &str, reference: &ImageReference, local_path: &str) -> String {
  let mut result = String::with_capacity(content.len());
  result.push_str(&content[..reference.start]);
  result.push_str(&local_image_link(local_path));
  result.push_str(&content[reference.end..]);
  result
}

/// Replace every reference that has a resolved local path.
///
/// `resolved` is parallel to `references`; `None` entries (failed downloads)
/// are left untouched in the content. Spans are applied strictly by
/// descending start offset so that pending offsets stay valid.
pub fn rewrite_all(content: &str, references: &[ImageReference], resolved: &[Option<String>]) -> String {
  debug_assert_eq!(references.len(), resolved.len());

  let mut order: Vec<usize> = (0..references.len()).collect();
  order.sort_by(|a, b| references[*b].start.cmp(&references[*a].start));

  let mut result = content.to_string();
  for index in order {
    if let Some(local_path) = &resolved[index] {
      result = replace_reference(&result, &references[index], local_path);
    }
  }

  result
}
