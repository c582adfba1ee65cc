//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default Gemini model when none is specified.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Base URL of the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Credential/provider name used in storage.
pub const PROVIDER: &str = "gemini";

/// Maximum number of solved problems kept in client-local history.
pub const HISTORY_LIMIT: usize = 20;

/// Number of characters of an answer shown in a history listing.
pub const EXCERPT_CHARS: usize = 200;

/// The user turn that opens every follow-up conversation.
pub const INITIAL_QUESTION: &str = "画像の問題を解いてください。";

/// Default HTTP port for `sensei serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit. Base64 photos from phone cameras are large.
pub const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Default database path: `~/.sensei/sensei.db`.
/// Single DB for settings, credentials, and the terminal client's history.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".sensei").join("sensei.db"))
}

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
