//! The per-note processing pipeline.
//!
//! Sequences scan results through download, save, and rewrite. Processing is
//! strictly sequential with a fixed pause between downloads so image hosts
//! do not rate-limit the run; references are handled in descending offset
//! order so each splice leaves the remaining offsets valid, and every
//! success is spliced into the note immediately rather than batched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::Local;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{ProcessError, classify_error};
use crate::fetcher::RemoteFetcher;
use crate::scanner::ImageReference;
use crate::{naming, paths, rewrite, validate};
use crate::vault::Vault;

/// Aggregate result of one run. Exactly one of success/failure is counted
/// per reference attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingOutcome {
  pub success_count: usize,
  pub failure_count: usize,
}

impl ProcessingOutcome {
  pub fn attempted(&self) -> usize {
    self.success_count + self.failure_count
  }
}

/// Downloads remote images referenced by a note and rewrites the note to
/// point at the local copies.
pub struct Processor {
  fetcher: Arc<dyn RemoteFetcher>,
  vault: Vault,
  settings: Settings,
  processing: AtomicBool,
}

/// Scoped hold on the processing flag; released on every exit path.
struct RunGuard<'a> {
  flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Result<Self> {
    flag
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .map_err(|_| anyhow!(ProcessError::Busy))?;
    Ok(Self { flag })
  }
}

impl Drop for RunGuard<'_> {
  fn drop(&mut self) {
    self.flag.store(false, Ordering::SeqCst);
  }
}

impl Processor {
  pub fn new(fetcher: Arc<dyn RemoteFetcher>, vault: Vault, settings: Settings) -> Self {
    Self {
      fetcher,
      vault,
      settings,
      processing: AtomicBool::new(false),
    }
  }

  /// Whether a run is currently active.
  pub fn is_processing(&self) -> bool {
    self.processing.load(Ordering::SeqCst)
  }

  /// Process the given references against a content snapshot of the note.
  ///
  /// `content` must be the exact text `references` were scanned from. Each
  /// reference succeeds or fails independently; one failed download never
  /// aborts the run. The rewritten note is written back once at the end,
  /// and only if at least one reference was replaced.
  ///
  /// # Errors
  /// Fails up front with [`ProcessError::Busy`] when another run is active,
  /// or if the final note write fails. Per-reference failures are reported
  /// through the returned [`ProcessingOutcome`] instead.
  pub async fn process(&self, note_path: &str, content: &str, references: &[ImageReference]) -> Result<ProcessingOutcome> {
    let _guard = RunGuard::acquire(&self.processing)?;

    // Rightmost span first, so pending offsets stay valid as splices change
    // the length of the content. An explicit sort rather than trust in the
    // scanner's emission order.
    let mut ordered: Vec<&ImageReference> = references.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut outcome = ProcessingOutcome::default();
    let mut content = content.to_string();
    let throttle = Duration::from_millis(self.settings.throttle_ms);

    for reference in ordered {
      match self.localize_one(note_path, &content, reference, throttle).await {
        Ok(updated) => {
          content = updated;
          outcome.success_count += 1;
        }
        Err(error) => {
          let kind = classify_error(&error);
          warn!("failed to localize {}: {error:#} ({})", reference.url, kind.user_message());
          outcome.failure_count += 1;
        }
      }
    }

    if outcome.success_count > 0 {
      self.vault.write_note(note_path, &content).await?;
    }

    info!(
      "processed {} image(s): {} succeeded, {} failed",
      outcome.attempted(),
      outcome.success_count,
      outcome.failure_count
    );

    Ok(outcome)
  }

  /// Download, save, and splice a single reference. Returns the updated
  /// note content on success.
  async fn localize_one(
    &self,
    note_path: &str,
    content: &str,
    reference: &ImageReference,
    throttle: Duration,
  ) -> Result<String> {
    validate::validate_url(&reference.url).map_err(|reason| anyhow!("invalid URL {}: {reason}", reference.url))?;

    if !throttle.is_zero() {
      sleep(throttle).await;
    }

    let bytes = self.fetcher.fetch_bytes(&reference.url).await?;
    if bytes.is_empty() {
      return Err(anyhow!(ProcessError::EmptyDownload {
        url: reference.url.clone(),
      }));
    }

    let content_type = self.fetcher.fetch_content_type(&reference.url).await;
    let extension = naming::resolve_extension(&reference.url, &content_type);

    let file_name = naming::resolve_file_name(
      &extension,
      &self.settings.naming_format,
      paths::note_base_name(note_path),
      Local::now(),
    );
    validate::validate_file_name(&file_name).map_err(|reason| anyhow!("generated file name rejected: {reason}"))?;

    let folder = paths::resolve_folder(
      &self.settings.placement_policy(),
      note_path,
      self.settings.attachment_folder_path.as_deref(),
    );
    if !folder.is_empty() {
      validate::validate_path_safety(&folder).map_err(|reason| anyhow!("image folder rejected: {reason}"))?;
      self.vault.create_folder(&folder).await?;
    }

    let image_path = paths::join(&folder, &file_name);
    validate::validate_path_safety(&image_path).map_err(|reason| anyhow!("image path rejected: {reason}"))?;

    self.vault.write_binary(&image_path, &bytes).await?;
    debug!("saved {} -> {image_path} ({} bytes)", reference.url, bytes.len());

    let link_path = paths::resolve_link_path(self.settings.link_style(), note_path, &image_path);
    Ok(rewrite::replace_reference(content, reference, &link_path))
  }
}
