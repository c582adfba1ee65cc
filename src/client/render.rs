//! Plain-text rendering of answer HTML for the terminal.
//!
//! Ruby annotations become `漢字(かんじ)`, block boundaries become line
//! breaks, everything else is stripped.

/// Closing tags that end a line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "table", "tr", "section",
];

/// Tags whose text is not shown.
const HIDDEN_TAGS: &[&str] = &["rp", "script", "style"];

pub fn to_terminal(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut hidden = 0usize;

    while let Some(open) = rest.find('<') {
        if hidden == 0 {
            out.push_str(&decode_entities(&rest[..open]));
        }
        let after = &rest[open..];
        if !starts_tag(&after[1..]) {
            // `x < 3`, `3<5`: comparison, not markup.
            if hidden == 0 {
                out.push('<');
            }
            rest = &after[1..];
            continue;
        }
        let Some(close) = after.find('>') else {
            // A bare '<' in text, not a tag.
            if hidden == 0 {
                out.push_str(&decode_entities(after));
            }
            rest = "";
            break;
        };

        let (name, closing) = parse_tag(&after[1..close]);
        match name.as_str() {
            "rt" if hidden == 0 => out.push(if closing { ')' } else { '(' }),
            "br" if hidden == 0 => out.push('\n'),
            "li" if hidden == 0 && !closing => out.push_str("\n・"),
            n if HIDDEN_TAGS.contains(&n) => {
                if closing {
                    hidden = hidden.saturating_sub(1);
                } else {
                    hidden += 1;
                }
            }
            n if closing && hidden == 0 && BLOCK_TAGS.contains(&n) => out.push('\n'),
            _ => {}
        }
        rest = &after[close + 1..];
    }
    if hidden == 0 {
        out.push_str(&decode_entities(rest));
    }

    tidy(&out)
}

/// A tag opens only when `<` is directly followed by a letter, `/` or `!`.
fn starts_tag(after_lt: &str) -> bool {
    after_lt
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Lowercased tag name and whether it is a closing tag.
fn parse_tag(inner: &str) -> (String, bool) {
    let inner = inner.trim();
    let closing = inner.starts_with('/');
    let name = inner
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (name, closing)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Trim line ends, collapse runs of blank lines, drop leading/trailing blanks.
fn tidy(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank = false;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !blank && !lines.is_empty() {
                lines.push("");
            }
            blank = true;
        } else {
            lines.push(line);
            blank = false;
        }
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.join("\n")
}
