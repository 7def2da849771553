//! Download a resolved file to local staging and re-upload it to the chat.

mod progress;
pub mod staging;

use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::chat::ChatOutbox;
use crate::config::Config;
use crate::constants::{messages, CHUNK_SIZE};

pub use progress::{Phase, ProgressSink, ProgressThrottle};
pub use staging::StagedFile;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("download request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("download returned HTTP {0}")]
    Status(u16),
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("download stalled for {0:?}")]
    Stalled(Duration),
    #[error("staging I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload failed: {0:#}")]
    Upload(anyhow::Error),
}

impl RelayError {
    /// Reply shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(_) | Self::Status(_) | Self::TooLarge { .. } | Self::Stalled(_) => {
                messages::DOWNLOAD_FAILED
            }
            Self::Io(_) | Self::Upload(_) => messages::GENERIC_FAILURE,
        }
    }
}

/// Streams files from a direct link into the work directory and uploads them.
#[derive(Clone)]
pub struct Relay {
    http: reqwest::Client,
    work_dir: PathBuf,
    stall_timeout: Duration,
    progress_step: u8,
    max_file_size: Option<u64>,
}

impl Relay {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            work_dir: config.work_dir.clone(),
            stall_timeout: config.download_stall_timeout,
            progress_step: config.progress_step_percent,
            max_file_size: config.max_file_size,
        }
    }

    /// Download `url` and send it to the chat as a video named
    /// `terabox_<filename>`.
    ///
    /// The staged copy is deleted before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails, the staging file cannot be
    /// written, or the upload is rejected.
    pub async fn fetch_and_relay(
        &self,
        url: &str,
        filename: &str,
        progress: &dyn ProgressSink,
        outbox: &dyn ChatOutbox,
    ) -> Result<(), RelayError> {
        progress.report_phase(Phase::Starting).await;

        let staged = StagedFile::new(&self.work_dir, filename);
        let result = self.transfer(url, &staged, progress, outbox).await;
        staged.remove().await;
        result
    }

    async fn transfer(
        &self,
        url: &str,
        staged: &StagedFile,
        progress: &dyn ProgressSink,
        outbox: &dyn ChatOutbox,
    ) -> Result<(), RelayError> {
        let bytes = self.download(url, staged, progress).await?;
        info!(bytes, file = %staged.display_name(), "Download complete");

        progress.report_phase(Phase::Uploading).await;
        outbox
            .send_video(staged.path(), staged.display_name(), messages::VIDEO_CAPTION)
            .await
            .map_err(RelayError::Upload)?;

        info!(file = %staged.display_name(), "Uploaded video");
        Ok(())
    }

    /// Stream the response body into the staged file.
    ///
    /// The file is only created once the server has answered with HTTP 200.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error on non-200 responses, stalls, size-limit violations
    /// and write failures.
    pub async fn download(
        &self,
        url: &str,
        staged: &StagedFile,
        progress: &dyn ProgressSink,
    ) -> Result<u64, RelayError> {
        let response = tokio::time::timeout(self.stall_timeout, self.http.get(url).send())
            .await
            .map_err(|_| RelayError::Stalled(self.stall_timeout))??;

        if response.status() != reqwest::StatusCode::OK {
            return Err(RelayError::Status(response.status().as_u16()));
        }

        let total = response.content_length().filter(|&n| n > 0);
        if let (Some(size), Some(limit)) = (total, self.max_file_size) {
            if size > limit {
                return Err(RelayError::TooLarge { size, limit });
            }
        }

        debug!(total = ?total, path = %staged.path().display(), "Streaming download");
        if total.is_none() {
            progress.report_phase(Phase::Downloading).await;
        }

        let file = tokio::fs::File::create(staged.path()).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut throttle = ProgressThrottle::new(self.progress_step);
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        loop {
            let chunk = match tokio::time::timeout(self.stall_timeout, stream.next()).await {
                Err(_) => return Err(RelayError::Stalled(self.stall_timeout)),
                Ok(None) => break,
                Ok(Some(chunk)) => chunk?,
            };

            downloaded += chunk.len() as u64;
            if let Some(limit) = self.max_file_size {
                if downloaded > limit {
                    return Err(RelayError::TooLarge {
                        size: downloaded,
                        limit,
                    });
                }
            }

            writer.write_all(&chunk).await?;

            if let Some(percent) = throttle.observe(downloaded, total) {
                progress.report(percent).await;
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        Ok(downloaded)
    }
}
