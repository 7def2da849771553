//! TeraBox relay bot library.
//!
//! A Telegram bot that takes TeraBox share links, scrapes the share page for
//! download metadata, resolves a direct link, and re-uploads the file to the
//! chat it was requested from.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod bot;
pub mod chat;
pub mod config;
pub mod constants;
pub mod health;
pub mod pipeline;
pub mod relay;
pub mod terabox;
