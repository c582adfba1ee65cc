//! Reading the extractor's answer back as JSON.

use serde_json::{Value, json};

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

/// Told to the solver when the extractor's answer was not JSON.
pub const EXTRACTION_FAILED: &str =
    "グラフのデータ抽出に失敗しました。画像から直接問題に答えてください。";

/// Result of reading the extractor output.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(Value),
    /// Fallback object carrying the raw text.
    Failed(Value),
}

impl Extraction {
    pub fn value(&self) -> &Value {
        match self {
            Extraction::Parsed(v) | Extraction::Failed(v) => v,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }
}

/// Parse the extractor's reply, preferring the first ```json fenced block.
pub fn parse_extraction(raw: &str) -> Extraction {
    let candidate = fenced_json(raw).unwrap_or(raw);
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Extraction::Parsed(value),
        Err(e) => {
            tracing::warn!(error = %e, "extractor output is not JSON");
            Extraction::Failed(json!({
                "error": EXTRACTION_FAILED,
                "originalResponse": raw,
            }))
        }
    }
}

/// Body of the first ```json fence, up to the nearest closing fence.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(&rest[..end])
}
