use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::FILE_PREFIX;

/// Longest sanitized name kept on disk, leaving room for the run prefix.
const MAX_NAME_LEN: usize = 180;

/// Local copy of a file being relayed.
///
/// The on-disk name carries a per-run UUID so concurrent relays of files with
/// the same display name never share a path. The file is removed by
/// [`StagedFile::remove`], or on drop as a fallback.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    display_name: String,
    removed: bool,
}

impl StagedFile {
    /// Reserve a staging path for `filename`. Nothing is created on disk.
    #[must_use]
    pub fn new(work_dir: &Path, filename: &str) -> Self {
        let run_id = Uuid::new_v4();
        let on_disk = format!("{run_id}_{FILE_PREFIX}{}", sanitize_filename(filename));

        Self {
            path: work_dir.join(on_disk),
            display_name: format!("{FILE_PREFIX}{filename}"),
            removed: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the file is uploaded under.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Delete the staged file if it exists.
    pub async fn remove(mut self) {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove staged file: {e}"),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Make a remote display name safe to use as a single path component.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');

    if cleaned.is_empty() {
        return "file".to_string();
    }

    let mut end = cleaned.len().min(MAX_NAME_LEN);
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }
    cleaned[..end].to_string()
}

/// Remove files left behind by relays that never finished, e.g. after a crash.
///
/// # Errors
///
/// Returns an error if the work directory cannot be read.
pub async fn sweep_stale(work_dir: &Path) -> Result<usize> {
    let mut entries = tokio::fs::read_dir(work_dir)
        .await
        .with_context(|| format!("Failed to read work directory: {}", work_dir.display()))?;

    let marker = format!("_{FILE_PREFIX}");
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_staged = name
            .split_once(&marker)
            .is_some_and(|(run_id, _)| Uuid::parse_str(run_id).is_ok());
        if !is_staged || !entry.file_type().await?.is_file() {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), "Failed to remove stale file: {e}"),
        }
    }

    Ok(removed)
}
