//! `config` subcommand for inspecting and changing vault settings.
//!
//! Settings live in a JSON file at the vault root; `config show` prints the
//! effective values (defaults filled in) and `config set` validates and
//! persists a single key.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::config::{self, CONFIG_FILE, LinkPathType, SaveLocation};
use crate::validate;

/// Configuration subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
  /// Print the effective configuration for the vault
  Show,

  /// Set a configuration key and persist it
  Set {
    /// Configuration key (as it appears in `config show`)
    key: String,

    /// New value
    value: String,
  },
}

/// Execute the `config` subcommand.
pub(crate) fn handle_config_command(subcommand: &ConfigCommand, cli: &Cli, colors: &ColorScheme) {
  let result = match subcommand {
    ConfigCommand::Show => run_show(cli, colors),
    ConfigCommand::Set { key, value } => run_set(key, value, cli, colors),
  };

  if let Err(error) = result {
    eprintln!("{} {}", colors.error("✗"), colors.error("Configuration error"));
    eprintln!("  {}: {error:#}", colors.emphasis("Error"));
    process::exit(1);
  }
}

/// The vault root for config operations: `--vault` if given, otherwise the
/// current directory.
fn config_root(cli: &Cli) -> Result<PathBuf> {
  let dir = cli.vault.vault.as_deref().unwrap_or(".");
  let root = std::path::absolute(dir).with_context(|| format!("Could not resolve vault root {dir}"))?;
  if !root.is_dir() {
    return Err(anyhow!("vault root {} is not a directory", root.display()));
  }
  Ok(root)
}

fn run_show(cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let root = config_root(cli)?;
  let settings = config::load(&root);

  println!(
    "{} {}",
    colors.emphasis("Configuration for"),
    colors.path(root.join(CONFIG_FILE).display())
  );
  println!(
    "  {}: {}",
    colors.emphasis("saveLocation"),
    colors.code(save_location_name(settings.save_location))
  );
  println!(
    "  {}: {}",
    colors.emphasis("noteFolderName"),
    colors.code(&settings.note_folder_name)
  );
  println!(
    "  {}: {}",
    colors.emphasis("vaultFolderName"),
    colors.code(&settings.vault_folder_name)
  );
  println!(
    "  {}: {}",
    colors.emphasis("namingFormat"),
    colors.code(&settings.naming_format)
  );
  println!(
    "  {}: {}",
    colors.emphasis("linkPathType"),
    colors.code(link_path_type_name(settings.link_path_type))
  );
  println!(
    "  {}: {}",
    colors.emphasis("attachmentFolderPath"),
    match &settings.attachment_folder_path {
      Some(path) => colors.code(path),
      None => colors.dimmed("(unset)"),
    }
  );
  println!(
    "  {}: {}",
    colors.emphasis("throttleMs"),
    colors.number(settings.throttle_ms)
  );

  Ok(())
}

fn run_set(key: &str, value: &str, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let root = config_root(cli)?;
  let mut settings = config::load(&root);

  match key {
    "saveLocation" => {
      settings.save_location = parse_save_location(value)?;
    }
    "noteFolderName" => {
      validate::validate_folder_name(value).map_err(|reason| anyhow!("invalid folder name: {reason}"))?;
      settings.note_folder_name = value.to_string();
    }
    "vaultFolderName" => {
      validate::validate_folder_name(value).map_err(|reason| anyhow!("invalid folder name: {reason}"))?;
      settings.vault_folder_name = value.to_string();
    }
    "namingFormat" => {
      validate::validate_naming_format(value).map_err(|reason| anyhow!("invalid naming format: {reason}"))?;
      settings.naming_format = value.to_string();
    }
    "linkPathType" => {
      settings.link_path_type = parse_link_path_type(value)?;
    }
    "attachmentFolderPath" => {
      if value.is_empty() || value == "none" {
        settings.attachment_folder_path = None;
      } else if value == "/" {
        settings.attachment_folder_path = Some(value.to_string());
      } else {
        let cleaned = validate::sanitize_path(value);
        validate::validate_folder_name(&cleaned).map_err(|reason| anyhow!("invalid folder name: {reason}"))?;
        settings.attachment_folder_path = Some(cleaned);
      }
    }
    "throttleMs" => {
      settings.throttle_ms = value
        .parse::<u64>()
        .map_err(|_| anyhow!("throttleMs must be a non-negative integer, got {value:?}"))?;
    }
    _ => {
      return Err(anyhow!(
        "unknown key {key:?}; valid keys are saveLocation, noteFolderName, vaultFolderName, \
         namingFormat, linkPathType, attachmentFolderPath, throttleMs"
      ));
    }
  }

  config::save(&root, &settings)?;
  println!(
    "{} {} {} {}",
    colors.success("✓"),
    colors.emphasis(key),
    colors.dimmed("set to"),
    colors.code(value)
  );

  Ok(())
}

fn parse_save_location(value: &str) -> Result<SaveLocation> {
  match value {
    "noteFolder" => Ok(SaveLocation::NoteFolder),
    "vaultFolder" => Ok(SaveLocation::VaultFolder),
    "attachmentFolder" => Ok(SaveLocation::AttachmentFolder),
    _ => Err(anyhow!(
      "saveLocation must be one of noteFolder, vaultFolder, attachmentFolder; got {value:?}"
    )),
  }
}

fn parse_link_path_type(value: &str) -> Result<LinkPathType> {
  match value {
    "absolute" => Ok(LinkPathType::Absolute),
    "relative" => Ok(LinkPathType::Relative),
    _ => Err(anyhow!("linkPathType must be absolute or relative; got {value:?}")),
  }
}

fn save_location_name(location: SaveLocation) -> &'static str {
  match location {
    SaveLocation::NoteFolder => "noteFolder",
    SaveLocation::VaultFolder => "vaultFolder",
    SaveLocation::AttachmentFolder => "attachmentFolder",
  }
}

fn link_path_type_name(style: LinkPathType) -> &'static str {
  match style {
    LinkPathType::Absolute => "absolute",
    LinkPathType::Relative => "relative",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_save_location() {
    assert_eq!(parse_save_location("noteFolder").unwrap(), SaveLocation::NoteFolder);
    assert_eq!(
      parse_save_location("attachmentFolder").unwrap(),
      SaveLocation::AttachmentFolder
    );
    assert!(parse_save_location("note-folder").is_err());
  }

  #[test]
  fn test_parse_link_path_type() {
    assert_eq!(parse_link_path_type("relative").unwrap(), LinkPathType::Relative);
    assert!(parse_link_path_type("Relative").is_err());
  }

  #[test]
  fn test_names_roundtrip_with_parsers() {
    for location in [
      SaveLocation::NoteFolder,
      SaveLocation::VaultFolder,
      SaveLocation::AttachmentFolder,
    ] {
      assert_eq!(parse_save_location(save_location_name(location)).unwrap(), location);
    }
  }
}
