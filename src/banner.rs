//! Startup banner and session summary display.

use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};
use crate::generator::TokenUsage;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    /// `serve` or `solve`.
    pub mode: &'a str,
    pub model: &'a str,
    pub pipeline: &'a str,
    pub auth_status: &'a str,
    /// Listen URL when serving, tutor location when solving.
    pub endpoint: &'a str,
    pub history: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║              S E N S E I              ║
   ║   宿題の先生 · one step at a time      ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   mode      {}
   model     {} ({})
   auth      {}
   endpoint  {}
   history   {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.mode,
        info.model,
        info.pipeline,
        info.auth_status,
        info.endpoint,
        info.history,
    );
}

/// Print the session summary (token usage + farewell).
pub fn print_session_summary(usage: TokenUsage) {
    if usage.total() > 0 {
        println!(
            "session: {:>6} input + {:>6} output = {:>6} tokens",
            format_number(usage.input_tokens),
            format_number(usage.output_tokens),
            format_number(usage.total()),
        );
    }
    println!("またね。");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_banner_does_not_panic() {
        print_banner(&BannerInfo {
            mode: "serve",
            model: "gemini-1.5-flash-latest",
            pipeline: "two-step",
            auth_status: "not configured",
            endpoint: "http://127.0.0.1:3000",
            history: "browser",
        });
    }

    #[test]
    fn print_session_summary_with_and_without_tokens() {
        print_session_summary(TokenUsage {
            input_tokens: 1234,
            output_tokens: 567,
        });
        print_session_summary(TokenUsage::default());
    }
}
