//! Telegram front end: command replies and link handling.

mod outbox;

use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::messages;
use crate::pipeline::Pipeline;

pub use outbox::TelegramOutbox;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show the welcome message.")]
    Start,
    #[command(description = "explain how to use the bot.")]
    Help,
}

impl Command {
    /// Fixed reply for this command.
    #[must_use]
    pub const fn reply(&self) -> &'static str {
        match self {
            Self::Start => messages::WELCOME,
            Self::Help => messages::HELP,
        }
    }
}

/// Build the Bot API client.
///
/// teloxide's stock client gives up on any request after 17 seconds, which
/// is too short for video uploads, so the whole-request timeout comes from
/// `upload_timeout` instead.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_bot(config: &Config) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(config.upload_timeout)
        .build()
        .context("Failed to build Telegram HTTP client")?;

    let bot = Bot::with_client(&config.bot_token, client);
    Ok(match config.telegram_api_url.clone() {
        Some(api_url) => bot.set_api_url(api_url),
        None => bot,
    })
}

/// Run the update dispatcher until the process is asked to stop.
///
/// Updates from different chats are handled concurrently; updates within one
/// chat are handled in order.
pub async fn run(bot: Bot, pipeline: Arc<Pipeline>) {
    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pipeline])
        .default_handler(|_| async {
            debug!("Ignoring unsupported update");
        })
        .build()
        .dispatch()
        .await;
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    debug!(chat_id = msg.chat.id.0, command = ?cmd, "Received command");
    bot.send_message(msg.chat.id, cmd.reply()).await?;
    Ok(())
}

async fn handle_text(bot: Bot, msg: Message, pipeline: Arc<Pipeline>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let outbox = TelegramOutbox::new(bot.clone(), msg.chat.id, msg.id);
    match pipeline.run(text, &outbox).await {
        Ok(outcome) => info!(chat_id = msg.chat.id.0, outcome = ?outcome, "Handled message"),
        Err(e) => {
            error!(chat_id = msg.chat.id.0, "Failed to handle message: {e:#}");
            if let Err(e) = bot
                .send_message(msg.chat.id, messages::GENERIC_FAILURE)
                .await
            {
                warn!(chat_id = msg.chat.id.0, "Failed to report error to chat: {e}");
            }
        }
    }

    Ok(())
}
