//! Parsing of untrusted model output into a [`CommitRecord`].
//!
//! Model output is free-form text that may be wrapped in markdown fences or
//! not be JSON at all. Malformed output is an expected condition here, so
//! parsing yields `Option` and never an error.

use tracing::debug;

use crate::commit::record::CommitRecord;

/// Fence markers stripped before decoding, longest first.
const FENCE_MARKERS: &[&str] = &["```json", "```html", "```"];

/// Strip fences and line breaks so multi-line text fields cannot break decoding.
pub fn normalize_response(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in FENCE_MARKERS {
        text = text.replace(marker, "");
    }
    text.replace(['\r', '\n'], "").trim().to_string()
}

/// Parse a raw model response into a commit record.
///
/// Returns `None` when the response does not decode into `{title, body}` or
/// the title is blank.
pub fn parse_response(raw: &str) -> Option<CommitRecord> {
    let normalized = normalize_response(raw);

    // serde would also accept `[title, body]`; only objects are records.
    if !normalized.starts_with('{') {
        let preview: String = raw.chars().take(200).collect();
        debug!("Model response is not a JSON object. Response: {preview}");
        return None;
    }

    let mut record: CommitRecord = match serde_json::from_str(&normalized) {
        Ok(record) => record,
        Err(e) => {
            let preview: String = raw.chars().take(200).collect();
            debug!("Failed to parse model response as a commit record: {e}. Response: {preview}");
            return None;
        }
    };

    record.title = record.title.trim().to_string();
    if record.title.is_empty() {
        debug!("Model response has an empty title");
        return None;
    }

    Some(record)
}
