//! Text normalization shared by both classification paths.
//!
//! Pure string processing, no LLM calls:
//! - header lines (`From:`, `Subject:`, ...) are dropped
//! - a `--` separator line ends the message
//! - a trailing "Sent from my ..." / "Enviado do meu ..." line is dropped when
//!   some other text precedes it
//! - blank-line runs shrink to one, then all whitespace collapses to single spaces

use std::sync::LazyLock;

use regex::Regex;

static HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(from|to|subject|date|cc|bcc|reply-to|message-id):").unwrap()
});

static SEPARATOR_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{2,}$").unwrap());

static DEVICE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(sent from my|enviado do meu|enviado de meu|enviado desde mi)\b").unwrap()
});

/// Normalize raw email text into its canonical single-line form.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)` for any
/// input. Empty or whitespace-only input yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut current = clean_once(text);
    // A single-line result only loses text to the header or separator
    // rules. Each pass returns its input unchanged or a strictly shorter
    // string, so this settles.
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = collapse_whitespace(raw);

        if HEADER_LINE.is_match(&line) {
            continue;
        }
        if SEPARATOR_LINE.is_match(&line) {
            break;
        }
        lines.push(line);
    }

    let mut paragraphs = collapse_blank_runs(lines);
    strip_trailing_signature(&mut paragraphs);
    collapse_whitespace(&paragraphs.join("\n"))
}

/// Drop the last line when it is a device signature with text above it.
///
/// `lines` has no blank lines at either edge.
fn strip_trailing_signature(lines: &mut Vec<String>) {
    if lines.len() < 2 {
        return;
    }
    if lines.last().is_some_and(|l| DEVICE_SIGNATURE.is_match(l)) {
        lines.pop();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
    }
}

/// Collapse every whitespace run to one space and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most one blank line between non-blank lines, none at the edges.
fn collapse_blank_runs(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}
