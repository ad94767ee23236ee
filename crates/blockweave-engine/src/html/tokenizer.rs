//! Small forgiving HTML tokenizer.
//!
//! Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]` and are
//! lowercased. Comments, doctypes and processing instructions are dropped, as
//! is the content of `script` and `style`. Entities are decoded in text and
//! attribute values. Anything that does not look like a tag is text.

use super::cursor::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-')
}

fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style")
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut cur = Cursor::new(input);
    let mut out: Vec<Token> = Vec::new();

    while !cur.eof() {
        if cur.peek() != Some(b'<') {
            let text = cur.take_until(b"<");
            push_text(&mut out, text);
            continue;
        }

        if cur.starts_with(COMMENT_START) {
            cur.bump_n(COMMENT_START.len());
            cur.take_until(COMMENT_END);
            cur.bump_n(COMMENT_END.len());
            continue;
        }

        if matches!(cur.peek_at(1), Some(b'!') | Some(b'?')) {
            cur.take_until(b">");
            cur.bump();
            continue;
        }

        if cur.peek_at(1) == Some(b'/') && cur.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic())
        {
            cur.bump_n(2);
            let name = cur.take_while(is_name_byte).to_ascii_lowercase();
            cur.take_until(b">");
            cur.bump();
            out.push(Token::EndTag(name));
            continue;
        }

        if cur.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            let (name, attrs, self_closing) = read_start_tag(&mut cur);
            let raw = is_raw_text(&name);
            out.push(Token::StartTag {
                name: name.clone(),
                attrs,
                self_closing,
            });
            if raw && !self_closing {
                skip_raw_text(&mut cur, &name);
                out.push(Token::EndTag(name));
            }
            continue;
        }

        // A lone `<` is text.
        cur.bump();
        push_text(&mut out, "<");
    }

    out
}

fn push_text(out: &mut Vec<Token>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(raw);
    if let Some(Token::Text(prev)) = out.last_mut() {
        prev.push_str(&decoded);
    } else {
        out.push(Token::Text(decoded.into_owned()));
    }
}

/// Reads `<name attr="v" ...>` with the cursor on `<`.
fn read_start_tag(cur: &mut Cursor<'_>) -> (String, Vec<(String, String)>, bool) {
    cur.bump(); // <
    let name = cur.take_while(is_name_byte).to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => break,
            Some(b'>') => {
                cur.bump();
                break;
            }
            Some(b'/') => {
                cur.bump();
                if cur.peek() == Some(b'>') {
                    cur.bump();
                    self_closing = true;
                    break;
                }
            }
            Some(_) => {
                let attr_name = cur
                    .take_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
                    .to_ascii_lowercase();
                if attr_name.is_empty() {
                    // Stray byte such as a quote; skip it.
                    cur.bump();
                    continue;
                }
                cur.skip_whitespace();
                let value = if cur.peek() == Some(b'=') {
                    cur.bump();
                    cur.skip_whitespace();
                    read_attr_value(cur)
                } else {
                    String::new()
                };
                attrs.push((attr_name, value));
            }
        }
    }

    (name, attrs, self_closing)
}

fn read_attr_value(cur: &mut Cursor<'_>) -> String {
    let raw = match cur.peek() {
        Some(q @ (b'"' | b'\'')) => {
            cur.bump();
            let value = cur.take_until(&[q]);
            cur.bump();
            value
        }
        _ => cur.take_while(|b| !b.is_ascii_whitespace() && b != b'>'),
    };
    html_escape::decode_html_entities(raw).into_owned()
}

fn skip_raw_text(cur: &mut Cursor<'_>, name: &str) {
    let close = format!("</{name}");
    while !cur.eof() {
        cur.take_until(b"<");
        if cur.starts_with_ignore_case(close.as_bytes()) {
            cur.take_until(b">");
            cur.bump();
            return;
        }
        cur.bump();
    }
}
