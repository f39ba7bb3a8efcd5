//! Placement policy and link path resolution.
//!
//! All paths handled here are vault-relative, forward-slash strings (the
//! same convention the vault surface uses), never OS paths. Every function
//! is pure: resolution happens before any folder is created or any byte is
//! written.

/// Where downloaded images are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementPolicy {
  /// A named folder next to the note (`<note dir>/<name>`).
  NoteFolder { name: String },
  /// A named folder at the vault root.
  VaultFolder { name: String },
  /// Whatever folder the vault's own attachment convention designates.
  AttachmentFolder,
}

/// Whether rewritten links are vault-root-relative or note-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
  Absolute,
  Relative,
}

/// Fallback folder when the attachment convention reports nothing.
pub const DEFAULT_ATTACHMENT_FOLDER: &str = "attachments";

/// Directory portion of a vault-relative path, without trailing slash.
/// A path at the vault root has an empty directory.
pub fn parent_dir(path: &str) -> &str {
  match path.rfind('/') {
    Some(index) => &path[..index],
    None => "",
  }
}

/// Base name of a note without its `.md` extension.
pub fn note_base_name(note_path: &str) -> &str {
  let file_name = match note_path.rfind('/') {
    Some(index) => &note_path[index + 1..],
    None => note_path,
  };
  file_name.strip_suffix(".md").unwrap_or(file_name)
}

/// Compute the folder a downloaded image should be saved into.
///
/// `attachment_folder` is the vault's configured attachment folder, if any;
/// it only matters for [`PlacementPolicy::AttachmentFolder`], where `"/"`
/// means "same directory as the note" and a missing value falls back to
/// [`DEFAULT_ATTACHMENT_FOLDER`].
pub fn resolve_folder(policy: &PlacementPolicy, note_path: &str, attachment_folder: Option<&str>) -> String {
  match policy {
    PlacementPolicy::NoteFolder { name } => join(parent_dir(note_path), name),
    PlacementPolicy::VaultFolder { name } => name.clone(),
    PlacementPolicy::AttachmentFolder => match attachment_folder {
      Some("/") => parent_dir(note_path).to_string(),
      Some(folder) if !folder.is_empty() => folder.trim_matches('/').to_string(),
      _ => DEFAULT_ATTACHMENT_FOLDER.to_string(),
    },
  }
}

/// Join two vault-relative path components, tolerating an empty left side.
pub fn join(dir: &str, name: &str) -> String {
  if dir.is_empty() {
    name.to_string()
  } else {
    format!("{dir}/{name}")
  }
}

/// Compute the link text to substitute into the note for a saved image.
///
/// Absolute style returns the full vault-relative path unchanged. Relative
/// style emits the minimal `../`-prefixed path from the note's directory:
/// one `..` per note-directory segment below the longest common leading
/// prefix, then the remaining image segments.
pub fn resolve_link_path(style: LinkStyle, note_path: &str, image_path: &str) -> String {
  if style == LinkStyle::Absolute {
    return image_path.to_string();
  }

  let note_dir = parent_dir(note_path);
  if note_dir.is_empty() {
    // Note at the vault root: the root-relative path already is the
    // note-relative path.
    return image_path.to_string();
  }

  if let Some(suffix) = image_path.strip_prefix(&format!("{note_dir}/")) {
    return suffix.to_string();
  }

  let note_segments: Vec<&str> = note_dir.split('/').collect();
  let image_segments: Vec<&str> = image_path.split('/').collect();

  let common = note_segments
    .iter()
    .zip(image_segments.iter())
    .take_while(|(a, b)| a == b)
    .count();

  let mut relative = String::new();
  for _ in common..note_segments.len() {
    relative.push_str("../");
  }
  relative.push_str(&image_segments[common..].join("/"));
  relative
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parent_dir() {
    assert_eq!(parent_dir("notes/sub/n.md"), "notes/sub");
    assert_eq!(parent_dir("n.md"), "");
  }

  #[test]
  fn test_note_base_name() {
    assert_eq!(note_base_name("notes/sub/daily note.md"), "daily note");
    assert_eq!(note_base_name("n.md"), "n");
    assert_eq!(note_base_name("weird"), "weird");
  }

  #[test]
  fn test_resolve_folder_note_relative() {
    let policy = PlacementPolicy::NoteFolder {
      name: "assets".to_string(),
    };
    assert_eq!(resolve_folder(&policy, "notes/sub/n.md", None), "notes/sub/assets");
    assert_eq!(resolve_folder(&policy, "n.md", None), "assets");
  }

  #[test]
  fn test_resolve_folder_vault_root() {
    let policy = PlacementPolicy::VaultFolder {
      name: "attachments".to_string(),
    };
    assert_eq!(resolve_folder(&policy, "notes/sub/n.md", None), "attachments");
  }

  #[test]
  fn test_resolve_folder_attachment_convention() {
    let policy = PlacementPolicy::AttachmentFolder;
    assert_eq!(resolve_folder(&policy, "notes/n.md", Some("media")), "media");
    // "/" means "same folder as the note".
    assert_eq!(resolve_folder(&policy, "notes/n.md", Some("/")), "notes");
    // Unset or empty falls back to the default.
    assert_eq!(resolve_folder(&policy, "notes/n.md", None), "attachments");
    assert_eq!(resolve_folder(&policy, "notes/n.md", Some("")), "attachments");
  }

  #[test]
  fn test_link_path_absolute() {
    assert_eq!(
      resolve_link_path(LinkStyle::Absolute, "notes/sub/n.md", "attachments/f.png"),
      "attachments/f.png"
    );
  }

  #[test]
  fn test_link_path_relative_under_note_dir() {
    assert_eq!(
      resolve_link_path(LinkStyle::Relative, "notes/sub/n.md", "notes/sub/assets/f.png"),
      "assets/f.png"
    );
  }

  #[test]
  fn test_link_path_relative_climbs_out() {
    assert_eq!(
      resolve_link_path(LinkStyle::Relative, "notes/sub/n.md", "attachments/f.png"),
      "../../attachments/f.png"
    );
  }

  #[test]
  fn test_link_path_relative_partial_common_prefix() {
    assert_eq!(
      resolve_link_path(LinkStyle::Relative, "notes/sub/n.md", "notes/media/f.png"),
      "../media/f.png"
    );
  }

  #[test]
  fn test_link_path_relative_note_at_root() {
    // Zero directory segments above the note, so no "../" is ever emitted.
    assert_eq!(
      resolve_link_path(LinkStyle::Relative, "n.md", "attachments/f.png"),
      "attachments/f.png"
    );
  }
}
