//! Fakes and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use terabox_relay_bot::chat::{ChatOutbox, MessageRef};
use terabox_relay_bot::config::Config;
use terabox_relay_bot::relay::{Phase, ProgressSink};
use url::Url;

/// Something the bot sent to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { id: i32, text: String },
    Edit { id: i32, text: String },
    Delete { id: i32 },
    Video {
        filename: String,
        caption: String,
        /// Size of the staged file at upload time.
        bytes: usize,
        path: PathBuf,
    },
}

/// [`ChatOutbox`] that records every call.
#[derive(Default)]
pub struct RecordingOutbox {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    fail_uploads: bool,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn videos(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Video { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } | Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl ChatOutbox for RecordingOutbox {
    async fn send_text(&self, text: &str) -> Result<MessageRef> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.push(Sent::Text {
            id,
            text: text.to_string(),
        });
        Ok(MessageRef(id))
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()> {
        self.push(Sent::Edit {
            id: message.0,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        self.push(Sent::Delete { id: message.0 });
        Ok(())
    }

    async fn send_video(&self, path: &Path, filename: &str, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(path).await?.len();
        self.push(Sent::Video {
            filename: filename.to_string(),
            caption: caption.to_string(),
            bytes,
            path: path.to_path_buf(),
        });
        if self.fail_uploads {
            anyhow::bail!("upload rejected");
        }
        Ok(())
    }
}

/// Progress event seen by [`RecordingProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Percent(u8),
    Phase(Phase),
}

#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<Progress>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<Progress> {
        self.events.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Progress::Percent(p) => Some(p),
                Progress::Phase(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn report(&self, percent: u8) {
        self.events.lock().unwrap().push(Progress::Percent(percent));
    }

    async fn report_phase(&self, phase: Phase) {
        self.events.lock().unwrap().push(Progress::Phase(phase));
    }
}

/// Test configuration pointing TeraBox at `base_url` and staging in `work_dir`.
pub fn test_config(base_url: &str, work_dir: &Path) -> Config {
    Config {
        terabox_base_url: Url::parse(base_url).unwrap(),
        work_dir: work_dir.to_path_buf(),
        ..Config::for_testing()
    }
}

/// Number of entries in a directory.
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Share page in the current `window.__INITIAL_STATE__` layout.
pub fn initial_state_page(filename: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>TeraBox - share</title>
  <script src="/static/app.js"></script>
  <script>window.jsToken = "abc";</script>
</head>
<body>
  <div id="app"></div>
  <script>
    window.__INITIAL_STATE__ = {{"file":{{"share_id":48213,"sign":"3f9a1c","timestamp":1700000000,"list":[{{"fs_id":998877,"filename":"{filename}","size":4096,"meta":{{"w":{{}}}}}}]}},"user":{{"name":"x"}}}};
    window.__PRELOAD__ = true;
  </script>
</body>
</html>"#
    )
}

/// Share page in the older `fileList` layout.
pub const FILE_LIST_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>TeraBox</title></head>
<body>
  <script>
    var locals = {};
    var fileList = [{"fs_id":"5551212","server_filename":"old layout.mp4","isdir":0}];
    var sign = "c0ffee";
    var timestamp = "1699999999";
  </script>
</body>
</html>"#;

/// Page with no recognizable share data.
pub const EMPTY_PAGE: &str = r#"<!DOCTYPE html>
<html><head><script>var config = {"theme":"dark"};</script></head><body></body></html>"#;

/// Page whose embedded state is not valid JSON.
pub const MALFORMED_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<script>window.__INITIAL_STATE__ = {"file": {share_id: 1, "list": [}};</script>
<script>var fileList = [{fs_id: 1}]; var sign = "x"; var timestamp = 1;</script>
</body></html>"#;
