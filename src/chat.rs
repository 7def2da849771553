//! Outbound chat operations the pipeline depends on.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::constants::messages;
use crate::relay::{Phase, ProgressSink};

/// Opaque id of a message previously sent to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub i32);

/// Replies into the conversation a request came from.
#[async_trait]
pub trait ChatOutbox: Send + Sync {
    /// Send a text reply.
    async fn send_text(&self, text: &str) -> Result<MessageRef>;

    /// Replace the text of an earlier message.
    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()>;

    async fn delete_message(&self, message: MessageRef) -> Result<()>;

    /// Upload a local file as a video attachment.
    async fn send_video(&self, path: &Path, filename: &str, caption: &str) -> Result<()>;
}

/// The status message a request edits as it progresses.
pub struct StatusMessage<'a> {
    outbox: &'a dyn ChatOutbox,
    message: MessageRef,
}

impl<'a> StatusMessage<'a> {
    /// Post a new status message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn send(outbox: &'a dyn ChatOutbox, text: &str) -> Result<Self> {
        let message = outbox.send_text(text).await?;
        Ok(Self { outbox, message })
    }

    /// Replace the status text. Failures are logged and ignored.
    pub async fn set(&self, text: &str) {
        if let Err(e) = self.outbox.edit_text(self.message, text).await {
            warn!(message = self.message.0, "Failed to update status message: {e:#}");
        }
    }

    /// Remove the status message. Failures are logged and ignored.
    pub async fn delete(self) {
        if let Err(e) = self.outbox.delete_message(self.message).await {
            warn!(message = self.message.0, "Failed to delete status message: {e:#}");
        }
    }
}

#[async_trait]
impl ProgressSink for StatusMessage<'_> {
    async fn report(&self, percent: u8) {
        self.set(&messages::downloading_percent(percent)).await;
    }

    async fn report_phase(&self, phase: Phase) {
        self.set(phase.label()).await;
    }
}
