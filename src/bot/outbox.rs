use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};

use crate::chat::{ChatOutbox, MessageRef};

/// [`ChatOutbox`] that replies into one Telegram chat.
pub struct TelegramOutbox {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

impl TelegramOutbox {
    #[must_use]
    pub fn new(bot: Bot, chat_id: ChatId, reply_to: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            reply_to,
        }
    }
}

#[async_trait]
impl ChatOutbox for TelegramOutbox {
    async fn send_text(&self, text: &str) -> Result<MessageRef> {
        let sent = self
            .bot
            .send_message(self.chat_id, text)
            .reply_parameters(ReplyParameters::new(self.reply_to).allow_sending_without_reply())
            .await
            .context("Failed to send message")?;
        Ok(MessageRef(sent.id.0))
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(self.chat_id, MessageId(message.0), text)
            .await
            .context("Failed to edit message")?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        self.bot
            .delete_message(self.chat_id, MessageId(message.0))
            .await
            .context("Failed to delete message")?;
        Ok(())
    }

    async fn send_video(&self, path: &Path, filename: &str, caption: &str) -> Result<()> {
        let video = InputFile::file(path).file_name(filename.to_string());
        self.bot
            .send_video(self.chat_id, video)
            .caption(caption)
            .supports_streaming(true)
            .reply_parameters(ReplyParameters::new(self.reply_to).allow_sending_without_reply())
            .await
            .with_context(|| format!("Failed to upload {filename}"))?;
        Ok(())
    }
}
