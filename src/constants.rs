//! Shared constants used across the application.

/// User agent string sent with every TeraBox request.
///
/// TeraBox serves a stripped page to unknown clients, so this mirrors a
/// current desktop Chrome build.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header for top-level page navigations.
pub const NAVIGATION_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Prefix added to every relayed file name.
pub const FILE_PREFIX: &str = "terabox_";

/// Size of the staging write buffer.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// User-facing replies.
pub mod messages {
    pub const WELCOME: &str =
        "👋 Welcome! Send me a TeraBox link and I'll download the video for you.";
    pub const HELP: &str = "Send a TeraBox share link (terabox.com, 1024terabox.com or \
                            teraboxapp.com) and I'll reply with the video.";
    pub const INVALID_LINK: &str = "❌ Please send a valid TeraBox link.";
    pub const PROCESSING: &str = "🔍 Processing your link...";
    pub const EXTRACTION_FAILED: &str = "❌ Could not extract file information from the link.";
    pub const RESOLUTION_FAILED: &str = "❌ Could not get the download link.";
    pub const DOWNLOAD_FAILED: &str = "❌ Failed to download the file.";
    pub const GENERIC_FAILURE: &str = "❌ An error occurred while processing your request.";
    pub const STARTING: &str = "⬇️ Starting download...";
    pub const DOWNLOADING: &str = "⬇️ Downloading...";
    pub const UPLOADING: &str = "📤 Uploading to Telegram...";
    pub const VIDEO_CAPTION: &str = "Here's your video! 🎥";

    /// Progress line for a known total size.
    #[must_use]
    pub fn downloading_percent(percent: u8) -> String {
        format!("⬇️ Downloading: {percent}%")
    }
}
