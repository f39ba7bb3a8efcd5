//! `scan` subcommand for listing remote image references.
//!
//! Powers `mdimg-dl scan`, which reads a note and prints the remote image
//! links it would download, without touching the network or modifying
//! anything.

use std::process;

use anyhow::Result;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::commands::localize::{print_references, resolve_note};
use crate::scanner;

/// Execute the `scan` subcommand.
///
/// # Arguments
/// * `note` - Markdown note supplied on the CLI.
/// * `cli` - Top-level CLI options.
/// * `colors` - Shared color palette used to render terminal output.
pub(crate) async fn handle_scan_command(note: &str, cli: &Cli, colors: &ColorScheme) {
  if let Err(error) = run_scan_command(note, cli, colors).await {
    eprintln!("{} {}", colors.error("✗"), colors.error("Failed to scan note"));
    eprintln!("  {}: {error:#}", colors.emphasis("Error"));
    process::exit(1);
  }
}

async fn run_scan_command(note: &str, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let context = resolve_note(note, cli)?;

  let content = context.vault.read_note(&context.note_path).await?;
  let references = scanner::scan(&content);

  if references.is_empty() {
    println!("{} {}", colors.success("✓"), colors.info("No remote images found"));
    return Ok(());
  }

  println!(
    "{} {}",
    colors.info("→"),
    colors.info(format!(
      "{} remote {} in {}",
      colors.number(references.len()),
      if references.len() == 1 { "image" } else { "images" },
      colors.path(&context.note_path)
    ))
  );
  print_references(&references, colors);

  Ok(())
}
