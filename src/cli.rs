//! Command-line interface definitions for mdimg-dl.
//!
//! This module defines the CLI structure using clap derives and dispatches
//! parsed invocations to the subcommand handlers.

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::{Shell, handle_completions_command};
use crate::commands::config::{ConfigCommand, handle_config_command};
use crate::commands::localize::handle_localize;
use crate::commands::scan::handle_scan_command;
use crate::commands::version::handle_version_command;
use crate::config::{LinkPathType, SaveLocation, Settings};

/// mdimg-dl - Localize remote images referenced in Markdown notes
#[derive(Debug, Parser)]
#[command(
  name = "mdimg-dl",
  version,
  about = "Download remote images referenced in a Markdown note and rewrite the links to local copies",
  long_about = "A command-line tool that scans a Markdown note for remote image links,\n\
                downloads each image into the vault according to a placement policy,\n\
                and rewrites the note to reference the local files.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Markdown note to process
  #[arg(value_name = "NOTE")]
  pub note: Option<String>,

  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Vault options
  #[command(flatten)]
  pub vault: VaultOptions,

  /// Placement and naming options
  #[command(flatten)]
  pub placement: PlacementOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,

  /// Network options
  #[command(flatten)]
  pub network: NetworkOptions,
}

/// Subcommands for inspection and configuration
#[derive(Debug, Subcommand)]
pub enum Command {
  /// List remote image references in a note without downloading anything
  Scan {
    /// Markdown note to scan
    #[arg(value_name = "NOTE")]
    note: String,
  },

  /// Inspect or change the persisted vault configuration
  Config {
    #[command(subcommand)]
    subcommand: ConfigCommand,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Vault options
#[derive(Debug, Parser)]
pub struct VaultOptions {
  /// Vault root directory (defaults to the note's own directory)
  #[arg(long, env = "MDIMG_VAULT", value_name = "DIR")]
  pub vault: Option<String>,
}

/// Placement and naming options; unset options fall back to the vault's
/// persisted configuration.
#[derive(Debug, Parser)]
pub struct PlacementOptions {
  /// Where downloaded images are stored
  #[arg(long, value_enum, value_name = "POLICY")]
  pub save_location: Option<SaveLocation>,

  /// Folder name next to the note (with --save-location note-folder)
  #[arg(long, value_name = "NAME")]
  pub note_folder: Option<String>,

  /// Folder name at the vault root (with --save-location vault-folder)
  #[arg(long, value_name = "NAME")]
  pub vault_folder: Option<String>,

  /// Link style written back into the note
  #[arg(long, value_enum, value_name = "STYLE")]
  pub link_style: Option<LinkPathType>,

  /// Naming template for saved files (e.g. "{notename}_{date}_{time}")
  #[arg(long, value_name = "TEMPLATE")]
  pub naming_format: Option<String>,
}

impl PlacementOptions {
  /// Overlay CLI flags on top of settings loaded from the vault.
  pub fn apply(&self, settings: &mut Settings) {
    if let Some(save_location) = self.save_location {
      settings.save_location = save_location;
    }
    if let Some(name) = &self.note_folder {
      settings.note_folder_name = name.clone();
    }
    if let Some(name) = &self.vault_folder {
      settings.vault_folder_name = name.clone();
    }
    if let Some(style) = self.link_style {
      settings.link_path_type = style;
    }
    if let Some(format) = &self.naming_format {
      settings.naming_format = format.clone();
    }
  }
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// List what would be downloaded without downloading or rewriting
  #[arg(long)]
  pub dry_run: bool,

  /// Skip the confirmation prompt
  #[arg(short = 'y', long)]
  pub yes: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Network options
#[derive(Debug, Parser)]
pub struct NetworkOptions {
  /// Request timeout in seconds
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,

  /// Pause between successive downloads, in milliseconds (a throttle
  /// against remote rate-limiting, not a retry mechanism)
  #[arg(long, value_name = "MS")]
  pub delay: Option<u64>,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.note.is_none() && self.command.is_none() {
      return Err("Either provide a Markdown note or use a subcommand".to_string());
    }

    if let Some(ref note) = self.note
      && !note.to_lowercase().ends_with(".md")
    {
      return Err(format!("{note} is not a Markdown note (.md extension expected)"));
    }

    if self.network.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the
/// chosen command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  // Handle subcommands
  if let Some(ref command) = cli.command {
    match command {
      Command::Scan { note } => {
        handle_scan_command(note, &cli, &colors).await;
      }
      Command::Config { subcommand } => {
        handle_config_command(subcommand, &cli, &colors);
      }
      Command::Version { json, short } => {
        handle_version_command(*json, *short, &colors);
      }
      Command::Completions { shell } => {
        handle_completions_command(*shell);
      }
    }
    return;
  }

  // Handle main localize functionality
  if let Some(ref note) = cli.note {
    handle_localize(note, &cli, &colors).await;
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
