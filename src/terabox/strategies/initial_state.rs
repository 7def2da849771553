use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::traits::{ExtractionStrategy, SharePage};
use crate::terabox::metadata::scalar_to_string;
use crate::terabox::scan::assigned_literal;
use crate::terabox::ShareMetadata;

static ASSIGNMENT: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"window\.__INITIAL_STATE__\s*=").unwrap());

/// Current layout: the whole page state is serialized into
/// `window.__INITIAL_STATE__`.
pub struct InitialStateStrategy;

impl InitialStateStrategy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for InitialStateStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for InitialStateStrategy {
    fn name(&self) -> &'static str {
        "initial-state"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn extract(&self, page: &SharePage) -> Option<ShareMetadata> {
        page.scripts
            .iter()
            .filter(|script| script.contains("window.__INITIAL_STATE__"))
            .find_map(|script| {
                let literal = assigned_literal(script, &ASSIGNMENT)?;
                match serde_json::from_str::<Value>(literal) {
                    Ok(state) => from_state(&state),
                    Err(e) => {
                        debug!(error = %e, "Initial state is not valid JSON");
                        None
                    }
                }
            })
    }
}

fn from_state(state: &Value) -> Option<ShareMetadata> {
    let file = state.get("file")?;
    let first = file.get("list")?.get(0)?;

    let record = ShareMetadata::new(
        first.get("fs_id").and_then(scalar_to_string),
        file.get("share_id").and_then(scalar_to_string),
        file.get("sign").and_then(scalar_to_string),
        file.get("timestamp").and_then(scalar_to_string),
        first.get("filename").and_then(scalar_to_string),
    );
    if record.is_none() {
        debug!("Initial state is missing share fields");
    }
    record
}
