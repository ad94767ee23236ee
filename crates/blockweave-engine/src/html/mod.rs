//! # HTML Input
//!
//! Turns markup into a generic element tree for the deserializer.
//!
//! ## Modules
//!
//! - **`cursor`**: byte cursor used by the tokenizer
//! - **`tokenizer`**: `tokenize()` producing start/end/text tokens
//! - **`tree`**: `build_tree()` folding tokens into [`HtmlNode`]s
//!
//! The tree is deliberately simple (no HTML5 insertion modes); it only has to
//! be good enough to recover block structure and inline formatting.

pub mod cursor;
pub mod tokenizer;
pub mod tree;

/// A node of the parsed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
}

/// An element with a lowercased tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &HtmlElement> {
        self.children.iter().filter_map(|c| match c {
            HtmlNode::Element(e) => Some(e),
            HtmlNode::Text(_) => None,
        })
    }

    /// Concatenated descendant text; `<br>` counts as a newline.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(t) => out.push_str(t),
            HtmlNode::Element(e) if e.name == "br" => out.push('\n'),
            HtmlNode::Element(e) => collect_text(&e.children, out),
        }
    }
}

/// Tokenize and build the node forest in one step.
pub fn parse_html(input: &str) -> Vec<HtmlNode> {
    tree::build_tree(tokenizer::tokenize(input))
}
