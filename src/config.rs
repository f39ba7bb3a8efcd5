//! Persisted vault configuration.
//!
//! Settings live in a flat JSON file at the vault root. Loading never fails:
//! a missing or malformed file degrades to defaults with a warning, and a
//! pure validation step replaces any individually invalid field with its
//! default, reporting what was replaced.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::paths::{LinkStyle, PlacementPolicy};
use crate::validate;

/// Name of the configuration file at the vault root.
pub const CONFIG_FILE: &str = ".mdimg-dl.json";

/// Where downloaded images are stored (configuration value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SaveLocation {
  /// A named folder next to the note.
  NoteFolder,
  /// A named folder at the vault root.
  VaultFolder,
  /// The vault's own attachment folder convention.
  AttachmentFolder,
}

/// Link style written back into the note (configuration value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum LinkPathType {
  Absolute,
  Relative,
}

/// User-configurable behavior, persisted per vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
  /// Placement policy for saved images.
  pub save_location: SaveLocation,
  /// Folder name used with [`SaveLocation::NoteFolder`].
  pub note_folder_name: String,
  /// Folder name used with [`SaveLocation::VaultFolder`].
  pub vault_folder_name: String,
  /// Naming template for saved files; see the naming module for
  /// recognized placeholders.
  pub naming_format: String,
  /// Link style substituted into the note.
  pub link_path_type: LinkPathType,
  /// Vault-wide attachment folder, mirroring the host editor's own setting;
  /// `"/"` means "same folder as the note".
  pub attachment_folder_path: Option<String>,
  /// Pause between successive downloads, in milliseconds. A throttle, not a
  /// retry mechanism.
  pub throttle_ms: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      save_location: SaveLocation::NoteFolder,
      note_folder_name: "assets".to_string(),
      vault_folder_name: "attachments".to_string(),
      naming_format: "{notename}_{date}_{time}".to_string(),
      link_path_type: LinkPathType::Relative,
      attachment_folder_path: None,
      throttle_ms: 1500,
    }
  }
}

impl Settings {
  /// The placement policy these settings resolve to.
  pub fn placement_policy(&self) -> PlacementPolicy {
    match self.save_location {
      SaveLocation::NoteFolder => PlacementPolicy::NoteFolder {
        name: self.note_folder_name.clone(),
      },
      SaveLocation::VaultFolder => PlacementPolicy::VaultFolder {
        name: self.vault_folder_name.clone(),
      },
      SaveLocation::AttachmentFolder => PlacementPolicy::AttachmentFolder,
    }
  }

  pub fn link_style(&self) -> LinkStyle {
    match self.link_path_type {
      LinkPathType::Absolute => LinkStyle::Absolute,
      LinkPathType::Relative => LinkStyle::Relative,
    }
  }
}

/// Load settings from the vault root, degrading to defaults on any problem.
pub fn load(vault_root: &Path) -> Settings {
  let path = vault_root.join(CONFIG_FILE);

  let raw = match std::fs::read_to_string(&path) {
    Ok(raw) => raw,
    Err(error) => {
      if path.exists() {
        warn!("could not read {}: {error}; using defaults", path.display());
      }
      return Settings::default();
    }
  };

  match serde_json::from_str::<Settings>(&raw) {
    Ok(settings) => {
      let (settings, replaced) = validate_settings(settings);
      for message in replaced {
        warn!("{}: {message}", path.display());
      }
      settings
    }
    Err(error) => {
      warn!("malformed config {}: {error}; using defaults", path.display());
      Settings::default()
    }
  }
}

/// Persist settings to the vault root.
pub fn save(vault_root: &Path, settings: &Settings) -> Result<()> {
  let path = vault_root.join(CONFIG_FILE);
  let raw = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
  std::fs::write(&path, raw).with_context(|| format!("Failed to write config {}", path.display()))
}

/// Pure validation: replace each invalid field with its default and report
/// what was replaced.
pub fn validate_settings(mut settings: Settings) -> (Settings, Vec<String>) {
  let defaults = Settings::default();
  let mut replaced = Vec::new();

  if let Err(reason) = validate::validate_folder_name(&settings.note_folder_name) {
    replaced.push(format!(
      "noteFolderName {:?} replaced with {:?} ({reason})",
      settings.note_folder_name, defaults.note_folder_name
    ));
    settings.note_folder_name = defaults.note_folder_name.clone();
  }

  if let Err(reason) = validate::validate_folder_name(&settings.vault_folder_name) {
    replaced.push(format!(
      "vaultFolderName {:?} replaced with {:?} ({reason})",
      settings.vault_folder_name, defaults.vault_folder_name
    ));
    settings.vault_folder_name = defaults.vault_folder_name.clone();
  }

  if let Err(reason) = validate::validate_naming_format(&settings.naming_format) {
    replaced.push(format!(
      "namingFormat {:?} replaced with {:?} ({reason})",
      settings.naming_format, defaults.naming_format
    ));
    settings.naming_format = defaults.naming_format.clone();
  }

  if let Some(folder) = &settings.attachment_folder_path
    && folder != "/"
    && !folder.is_empty()
    && validate::validate_folder_name(folder).is_err()
  {
    replaced.push(format!("attachmentFolderPath {folder:?} cleared (invalid folder name)"));
    settings.attachment_folder_path = None;
  }

  (settings, replaced)
}
