//! Markdown checklist import and export.
//!
//! Each item is one `- [ ] text` / `- [x] text` line. Backslashes and line
//! breaks inside text are escaped as `\\`, `\n` and `\r` so an item never
//! spans lines. A trailing whitespace character is written as `\u{hex}` so it
//! survives the end-of-line trim on import.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::item::TodoItem;

static CHECKBOX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s*\[([ xX])\]\s?(.*)$").unwrap_or_else(|e| panic!("checkbox regex: {e}"))
});

/// Render `items` as a markdown checklist, one line per item.
#[must_use]
pub fn to_markdown(items: &[TodoItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str("- ");
        out.push_str(item.status().checkbox());
        out.push(' ');
        out.push_str(&escape(&item.text));
        out.push('\n');
    }
    out
}

/// Extract checklist items from markdown. Lines that are not checkbox list
/// entries are skipped.
#[must_use]
pub fn parse_markdown(input: &str) -> Vec<TodoItem> {
    input
        .lines()
        .filter_map(|line| {
            let caps = CHECKBOX_LINE.captures(line)?;
            let completed = caps[1].eq_ignore_ascii_case("x");
            let (body, last) = split_trailing_escape(caps[2].trim_end());
            let mut text = unescape(body);
            text.extend(last);
            Some(TodoItem::with_completed(text, completed))
        })
        .collect()
}

fn escape(text: &str) -> String {
    let (body, last) = match text.chars().next_back() {
        Some(ch) if ch.is_whitespace() && ch != '\n' && ch != '\r' => {
            (&text[..text.len() - ch.len_utf8()], Some(ch))
        }
        _ => (text, None),
    };

    let mut out = String::with_capacity(text.len());
    for ch in body.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    if let Some(ch) = last {
        out.push_str(&format!("\\u{{{:x}}}", u32::from(ch)));
    }
    out
}

/// Split a final `\u{hex}` whitespace escape off `text`. The marker only
/// counts when its backslash is not itself escaped.
fn split_trailing_escape(text: &str) -> (&str, Option<char>) {
    let Some(start) = text.rfind("\\u{") else {
        return (text, None);
    };
    let decoded = text[start + 3..]
        .strip_suffix('}')
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32)
        .filter(|ch| ch.is_whitespace());
    let escaped_backslash = text[..start]
        .chars()
        .rev()
        .take_while(|&ch| ch == '\\')
        .count()
        % 2
        == 1;

    match decoded {
        Some(ch) if !escaped_backslash => (&text[..start], Some(ch)),
        _ => (text, None),
    }
}

/// Unknown escapes are kept verbatim.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
