//! The default `mdimg-dl` command: download the remote images referenced in
//! a note and rewrite the links to the local copies.
//!
//! The handler resolves the vault and note, merges persisted settings with
//! CLI overrides, previews what will be downloaded, asks for confirmation,
//! and then runs the processing pipeline.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::config::{self, Settings};
use crate::fetcher::HttpFetcher;
use crate::processor::Processor;
use crate::scanner::{self, ImageReference};
use crate::vault::Vault;

/// A note resolved against its vault: the vault handle plus the note's
/// vault-relative path.
pub(crate) struct NoteContext {
  pub vault: Vault,
  pub note_path: String,
}

/// Resolve the note argument and `--vault` flag into a [`NoteContext`].
///
/// When no vault root is given the note's own directory is used, which makes
/// single-folder setups work without any flags.
pub(crate) fn resolve_note(note: &str, cli: &Cli) -> Result<NoteContext> {
  let note_abs = std::path::absolute(note).with_context(|| format!("Could not resolve path {note}"))?;
  if !note_abs.is_file() {
    return Err(anyhow!("note {} does not exist", note_abs.display()));
  }

  let root: PathBuf = match &cli.vault.vault {
    Some(dir) => {
      let root = std::path::absolute(dir).with_context(|| format!("Could not resolve vault root {dir}"))?;
      if !root.is_dir() {
        return Err(anyhow!("vault root {} is not a directory", root.display()));
      }
      root
    }
    None => note_abs
      .parent()
      .ok_or_else(|| anyhow!("note {} has no parent directory", note_abs.display()))?
      .to_path_buf(),
  };

  let vault = Vault::new(root);
  let note_path = vault.relative_path_of(&note_abs)?;
  Ok(NoteContext { vault, note_path })
}

/// Merge persisted vault settings with CLI overrides, re-validating the
/// result so an invalid flag value degrades to the default with a warning
/// just like an invalid config value would.
pub(crate) fn effective_settings(vault: &Vault, cli: &Cli, colors: &ColorScheme) -> Settings {
  let mut settings = config::load(vault.root());
  cli.placement.apply(&mut settings);
  if let Some(delay) = cli.network.delay {
    settings.throttle_ms = delay;
  }

  let (settings, replaced) = config::validate_settings(settings);
  for message in replaced {
    eprintln!("{} {}", colors.warning("⚠"), colors.warning(message));
  }
  settings
}

/// Print the scanned references as a numbered preview list.
pub(crate) fn print_references(references: &[ImageReference], colors: &ColorScheme) {
  for (index, reference) in references.iter().enumerate() {
    println!("  {} {}", colors.number(format!("{}.", index + 1)), colors.link(&reference.url));
  }
}

/// Execute the default localize command.
pub(crate) async fn handle_localize(note: &str, cli: &Cli, colors: &ColorScheme) {
  if let Err(error) = run_localize(note, cli, colors).await {
    eprintln!("{} {}", colors.error("✗"), colors.error("Failed to localize images"));
    eprintln!("  {}: {error:#}", colors.emphasis("Error"));
    process::exit(1);
  }
}

async fn run_localize(note: &str, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let context = resolve_note(note, cli)?;
  let settings = effective_settings(&context.vault, cli, colors);

  println!("{} {}", colors.progress("→"), colors.info("Scanning note for remote images"));
  println!("  {}: {}", colors.emphasis("Note"), colors.path(&context.note_path));
  println!(
    "  {}: {}",
    colors.emphasis("Vault"),
    colors.path(context.vault.root().display())
  );

  let content = context.vault.read_note(&context.note_path).await?;
  let references = scanner::scan(&content);

  if references.is_empty() {
    println!("\n{} {}", colors.success("✓"), colors.info("No remote images to localize"));
    return Ok(());
  }

  println!(
    "\n{} {}",
    colors.info("→"),
    colors.info(format!(
      "Found {} remote {}",
      colors.number(references.len()),
      if references.len() == 1 { "image" } else { "images" }
    ))
  );
  print_references(&references, colors);

  if cli.behavior.dry_run {
    println!(
      "\n{} {}",
      colors.warning("⚠"),
      colors.warning("Dry run - nothing downloaded, note unchanged")
    );
    return Ok(());
  }

  if !cli.behavior.yes && !confirm(references.len(), colors)? {
    println!("{} {}", colors.warning("⚠"), colors.warning("Aborted"));
    return Ok(());
  }

  let fetcher = Arc::new(HttpFetcher::new(cli.network.timeout)?);
  let processor = Processor::new(fetcher, context.vault.clone(), settings);

  println!("\n{} {}", colors.progress("→"), colors.info("Downloading images"));
  let outcome = processor.process(&context.note_path, &content, &references).await?;

  if outcome.success_count > 0 {
    println!(
      "{} {}",
      colors.success("✓"),
      colors.success(format!(
        "Localized {} {}",
        outcome.success_count,
        if outcome.success_count == 1 { "image" } else { "images" }
      ))
    );
  }
  if outcome.failure_count > 0 {
    eprintln!(
      "{} {}",
      colors.warning("⚠"),
      colors.warning(format!(
        "{} download(s) failed; those links were left untouched",
        outcome.failure_count
      ))
    );
  }

  // Nothing succeeded at all: surface it through the exit code.
  if outcome.success_count == 0 {
    process::exit(1);
  }

  Ok(())
}

/// Prompt for confirmation on stdin. Only an explicit yes proceeds.
fn confirm(count: usize, colors: &ColorScheme) -> Result<bool> {
  print!(
    "\n{} Download {} {}? [y/N] ",
    colors.emphasis("?"),
    count,
    if count == 1 { "image" } else { "images" }
  );
  io::stdout().flush().context("Failed to flush stdout")?;

  let mut answer = String::new();
  io::stdin()
    .lock()
    .read_line(&mut answer)
    .context("Failed to read confirmation")?;

  let answer = answer.trim().to_lowercase();
  Ok(answer == "y" || answer == "yes")
}
