use serde_json::Value;

/// Everything needed to ask TeraBox for a direct download link.
///
/// Only ever built complete: every field is a non-empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMetadata {
    /// `fs_id` of the shared file.
    pub file_id: String,
    /// Public share id (`surl`).
    pub share_id: String,
    /// Short-lived signature issued with the page.
    pub sign: String,
    /// Timestamp issued with `sign`; replayed verbatim.
    pub timestamp: String,
    /// Display name of the remote file.
    pub filename: String,
}

impl ShareMetadata {
    /// Assemble a record, rejecting it if any field is missing or empty.
    #[must_use]
    pub fn new(
        file_id: Option<String>,
        share_id: Option<String>,
        sign: Option<String>,
        timestamp: Option<String>,
        filename: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(Self {
            file_id: present(file_id)?,
            share_id: present(share_id)?,
            sign: present(sign)?,
            timestamp: present(timestamp)?,
            filename: present(filename)?,
        })
    }
}

/// Render a JSON scalar the way it appeared in the page.
///
/// Numbers keep their literal digits; `null`, objects and arrays yield `None`.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
