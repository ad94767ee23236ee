//! Markdown syntax for text leaves.
//!
//! Delimiters hug the text: surrounding whitespace is moved outside them,
//! since CommonMark does not treat `** bold **` as emphasis. Code spans pick a
//! backtick fence longer than any run inside the text.
//!
//! Block markers are escaped where a line of block text starts, so a
//! paragraph reading `# not a heading` stays a paragraph.

use crate::registry::Registry;
use crate::schema::{Mark, TextLeaf};

const ESCAPED: &[char] = &['\\', '*', '_', '`', '[', ']', '<', '>', '~'];

pub fn leaf(leaf: &TextLeaf, registry: &Registry) -> String {
    let marks: Vec<Mark> = leaf
        .marks
        .iter()
        .filter(|mark| registry.has_mark(*mark))
        .collect();
    let text = leaf.text.as_str();
    let core = text.trim();
    if marks.is_empty() || core.is_empty() {
        return escape(text);
    }

    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];

    let mut body = if marks.contains(&Mark::Code) {
        code_span(core)
    } else {
        escape(core)
    };
    for mark in marks.iter().rev().filter(|m| **m != Mark::Code) {
        let (open, close) = mark.markdown_delimiters();
        body = format!("{open}{body}{close}");
    }
    format!("{lead}{body}{trail}")
}

/// Backslash-escape characters Markdown would read as syntax.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Backslash-escape a block marker (`#`, `-`, `+`, `=`, `1.`, `1)`) at the
/// start of every line of serialized block text.
pub fn escape_line_starts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_line(&mut out, line);
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    let body = line.trim_start_matches([' ', '\t']);
    out.push_str(&line[..line.len() - body.len()]);

    if body.starts_with(['#', '-', '+', '=']) {
        out.push('\\');
        out.push_str(body);
        return;
    }

    let digits = body.bytes().take_while(|b| b.is_ascii_digit()).count();
    let rest = &body[digits..];
    let ordered_marker = (1..=9).contains(&digits)
        && rest.starts_with(['.', ')'])
        && rest[1..].chars().next().is_none_or(char::is_whitespace);
    if ordered_marker {
        out.push_str(&body[..digits]);
        out.push('\\');
        out.push_str(rest);
    } else {
        out.push_str(body);
    }
}

fn code_span(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}
