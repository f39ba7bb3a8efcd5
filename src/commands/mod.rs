//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `mdimg-dl` command,
//! keeping the top-level `main.rs` lightweight while still allowing the
//! handlers to share utilities and types.

pub mod completions;
pub mod config;
pub mod localize;
pub mod scan;
pub mod version;
