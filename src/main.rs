//! mdimg-dl - Localize remote images referenced in Markdown notes
//!
//! This is the main entry point for the CLI application.

use mdimg_dl::cli;

#[tokio::main]
async fn main() {
  cli::run().await;
}
