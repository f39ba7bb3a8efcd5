//! Markdown image localizer library
//!
//! This library scans Markdown notes for remote image links, downloads the
//! images into a vault, and rewrites the links to point at the local copies.

pub mod cli;
pub mod color;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod naming;
pub mod paths;
pub mod processor;
pub mod rewrite;
pub mod scanner;
pub mod validate;
pub mod vault;
