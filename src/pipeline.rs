//! Per-message flow: validate, extract, resolve, relay.

use anyhow::Result;
use tracing::{info, warn};

use crate::chat::{ChatOutbox, StatusMessage};
use crate::config::Config;
use crate::constants::messages;
use crate::relay::Relay;
use crate::terabox::{parse_share_url, TeraboxClient};

/// How a message run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Text was not a supported link.
    Rejected,
    ExtractionFailed,
    ResolutionFailed,
    RelayFailed,
    /// The file was uploaded to the chat.
    Delivered,
}

/// Everything needed to serve one message; cheap to share between handlers.
#[derive(Clone)]
pub struct Pipeline {
    terabox: TeraboxClient,
    relay: Relay,
}

impl Pipeline {
    /// Build the pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let terabox = TeraboxClient::new(config)?;
        let relay = Relay::new(terabox.http().clone(), config);
        Ok(Self::from_parts(terabox, relay))
    }

    #[must_use]
    pub fn from_parts(terabox: TeraboxClient, relay: Relay) -> Self {
        Self { terabox, relay }
    }

    /// Handle one inbound text message.
    ///
    /// Stage failures are reported to the user through the status message
    /// and returned as an [`Outcome`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns an error only if the chat itself cannot be reached for the
    /// rejection reply or the initial status message.
    pub async fn run(&self, text: &str, outbox: &dyn ChatOutbox) -> Result<Outcome> {
        let Some(share_url) = parse_share_url(text) else {
            outbox.send_text(messages::INVALID_LINK).await?;
            return Ok(Outcome::Rejected);
        };

        info!(url = %share_url, "Processing share link");
        let status = StatusMessage::send(outbox, messages::PROCESSING).await?;

        let metadata = match self.terabox.extract_metadata(&share_url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(url = %share_url, "Extraction failed: {e}");
                status.set(messages::EXTRACTION_FAILED).await;
                return Ok(Outcome::ExtractionFailed);
            }
        };

        let dlink = match self.terabox.resolve_download_link(&metadata).await {
            Ok(dlink) => dlink,
            Err(e) => {
                warn!(share_id = %metadata.share_id, "Link resolution failed: {e}");
                status.set(messages::RESOLUTION_FAILED).await;
                return Ok(Outcome::ResolutionFailed);
            }
        };

        match self
            .relay
            .fetch_and_relay(&dlink, &metadata.filename, &status, outbox)
            .await
        {
            Ok(()) => {
                status.delete().await;
                info!(share_id = %metadata.share_id, "Delivered file");
                Ok(Outcome::Delivered)
            }
            Err(e) => {
                warn!(share_id = %metadata.share_id, "Relay failed: {e}");
                status.set(e.user_message()).await;
                Ok(Outcome::RelayFailed)
            }
        }
    }
}
