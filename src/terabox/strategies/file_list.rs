use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::traits::{ExtractionStrategy, SharePage};
use crate::terabox::metadata::scalar_to_string;
use crate::terabox::scan::assigned_literal;
use crate::terabox::validate::share_id_from_url;
use crate::terabox::ShareMetadata;

static FILE_LIST: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\bfileList\s*=").unwrap());

static SIGN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"\bsign\s*=\s*['"]([^'"]+)['"]"#).unwrap());

static TIMESTAMP: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"\btimestamp\s*=\s*['"]?(\d+)"#).unwrap());

/// Older layout: `fileList`, `sign` and `timestamp` are separate script
/// variables and the share id only appears in the URL.
pub struct FileListStrategy;

impl FileListStrategy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for FileListStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for FileListStrategy {
    fn name(&self) -> &'static str {
        "file-list"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn extract(&self, page: &SharePage) -> Option<ShareMetadata> {
        page.scripts
            .iter()
            .filter(|script| script.contains("fileList"))
            .find_map(|script| from_script(script, page))
    }
}

fn from_script(script: &str, page: &SharePage) -> Option<ShareMetadata> {
    let literal = assigned_literal(script, &FILE_LIST)?;
    let list: Value = match serde_json::from_str(literal) {
        Ok(list) => list,
        Err(e) => {
            debug!(error = %e, "fileList is not valid JSON");
            return None;
        }
    };
    let first = list.get(0)?;

    let sign = SIGN.captures(script).map(|c| c[1].to_string());
    let timestamp = TIMESTAMP.captures(script).map(|c| c[1].to_string());

    let record = ShareMetadata::new(
        first.get("fs_id").and_then(scalar_to_string),
        share_id_from_url(&page.url),
        sign,
        timestamp,
        first.get("server_filename").and_then(scalar_to_string),
    );
    if record.is_none() {
        debug!(url = %page.url, "fileList script is missing share fields");
    }
    record
}
