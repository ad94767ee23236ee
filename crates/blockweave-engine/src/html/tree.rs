use super::tokenizer::Token;
use super::{HtmlElement, HtmlNode};

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Start tags that implicitly close an open element of the same name.
fn closes_same(name: &str) -> bool {
    matches!(name, "p" | "li" | "option")
}

/// Builds a node forest from tokens using a stack of open elements.
///
/// Unmatched end tags are ignored; an end tag closes every element opened
/// after its matching start tag; anything still open at the end is closed.
pub fn build_tree(tokens: Vec<Token>) -> Vec<HtmlNode> {
    let mut roots: Vec<HtmlNode> = Vec::new();
    let mut open: Vec<HtmlElement> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => append(&mut open, &mut roots, HtmlNode::Text(text)),
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                if closes_same(&name) && open.last().is_some_and(|e| e.name == name) {
                    close_top(&mut open, &mut roots);
                }
                let element = HtmlElement {
                    name,
                    attrs,
                    children: Vec::new(),
                };
                if self_closing || is_void_element(&element.name) {
                    append(&mut open, &mut roots, HtmlNode::Element(element));
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                if let Some(idx) = open.iter().rposition(|e| e.name == name) {
                    while open.len() > idx {
                        close_top(&mut open, &mut roots);
                    }
                }
            }
        }
    }

    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    roots
}

fn append(open: &mut [HtmlElement], roots: &mut Vec<HtmlNode>, node: HtmlNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn close_top(open: &mut Vec<HtmlElement>, roots: &mut Vec<HtmlNode>) {
    if let Some(element) = open.pop() {
        append(open, roots, HtmlNode::Element(element));
    }
}
