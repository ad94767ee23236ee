//! # Serialization
//!
//! Tree to text. Each block is serialized by its plugin's hook for the
//! requested [`Format`], which receives the element and its already
//! serialized inner text (leaves wrapped in mark syntax, inline elements
//! through their own plugin hooks). Output is the concatenation of the block
//! outputs in document order; separators are the plugins' business, except
//! that Markdown output of a lazily continued block (a list item) gets a
//! blank line before a following block of another type.
//!
//! Problems never abort a document. A block of unknown type or without a
//! serializer contributes its raw inner text, and a format no plugin supports
//! degrades to the document's plain text. [`serialize_with_report`] returns
//! what went wrong alongside the output.

pub mod html;
pub mod markdown;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{UnknownTypeError, UnsupportedFormatError};
use crate::registry::Registry;
use crate::schema::{BlockElement, BlockId, Child, Document, ElementRef, InlineElement, TextLeaf};

/// External text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Html,
    Markdown,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Markdown => "markdown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Format::Html),
            "markdown" | "md" => Ok(Format::Markdown),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// Something that was recovered from while serializing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeIssue {
    UnknownType(UnknownTypeError),
    MissingSerializer {
        id: BlockId,
        plugin_type: String,
        format: Format,
    },
    UnsupportedFormat(UnsupportedFormatError),
}

impl fmt::Display for SerializeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeIssue::UnknownType(err) => err.fmt(f),
            SerializeIssue::MissingSerializer {
                id,
                plugin_type,
                format,
            } => write!(f, "Block {id} ({plugin_type}) has no {format} serializer"),
            SerializeIssue::UnsupportedFormat(err) => err.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Serialized {
    pub output: String,
    pub issues: Vec<SerializeIssue>,
}

pub fn serialize(doc: &Document, registry: &Registry, format: Format) -> String {
    serialize_with_report(doc, registry, format).output
}

pub fn serialize_html(doc: &Document, registry: &Registry) -> String {
    serialize(doc, registry, Format::Html)
}

pub fn serialize_markdown(doc: &Document, registry: &Registry) -> String {
    serialize(doc, registry, Format::Markdown)
}

pub fn serialize_with_report(doc: &Document, registry: &Registry, format: Format) -> Serialized {
    if !registry.supports(format) {
        log::warn!("No registered plugin supports {format}; emitting plain text");
        return Serialized {
            output: doc.plain_text(),
            issues: vec![SerializeIssue::UnsupportedFormat(UnsupportedFormatError {
                format,
            })],
        };
    }

    let mut out = Serialized::default();
    let mut blocks = doc.blocks.iter().peekable();
    while let Some(block) = blocks.next() {
        let chunk = serialize_block(block, registry, format, &mut out.issues);
        out.output.push_str(&chunk);
        if format == Format::Markdown
            && let Some(next) = blocks.peek()
            && absorbs_next(block, next, registry)
            && !out.output.ends_with("\n\n")
        {
            if !out.output.ends_with('\n') {
                out.output.push('\n');
            }
            out.output.push('\n');
        }
    }
    log::debug!(
        "Serialized {} blocks to {format} ({} issues)",
        doc.len(),
        out.issues.len()
    );
    out
}

/// Whether Markdown would read `next` as a continuation of `block`.
fn absorbs_next(block: &BlockElement, next: &BlockElement, registry: &Registry) -> bool {
    block.plugin_type != next.plugin_type
        && registry
            .plugin(&block.plugin_type)
            .is_some_and(|p| p.markdown_continues_lazily())
}

fn serialize_block(
    block: &BlockElement,
    registry: &Registry,
    format: Format,
    issues: &mut Vec<SerializeIssue>,
) -> String {
    let mut inner = inner_text(block, registry, format, issues);
    if format == Format::Markdown {
        inner = markdown::escape_line_starts(&inner);
    }

    let Some(plugin) = registry.plugin(&block.plugin_type) else {
        let err = UnknownTypeError {
            id: block.id.clone(),
            plugin_type: block.plugin_type.clone(),
        };
        log::warn!("{err}; emitting raw text");
        issues.push(SerializeIssue::UnknownType(err));
        return inner;
    };

    match plugin.serializer(format) {
        Some(hook) => hook(ElementRef::Block(block), &inner),
        None => {
            log::debug!(
                "{} has no {format} serializer; emitting raw text",
                block.plugin_type
            );
            issues.push(SerializeIssue::MissingSerializer {
                id: block.id.clone(),
                plugin_type: block.plugin_type.clone(),
                format,
            });
            inner
        }
    }
}

fn inner_text(
    block: &BlockElement,
    registry: &Registry,
    format: Format,
    issues: &mut Vec<SerializeIssue>,
) -> String {
    let mut out = String::new();
    for child in &block.children {
        match child {
            Child::Text(leaf) => out.push_str(&serialize_leaf(leaf, registry, format)),
            Child::Inline(inline) => {
                out.push_str(&serialize_inline(inline, block, registry, format, issues))
            }
        }
    }
    out
}

fn serialize_inline(
    inline: &InlineElement,
    parent: &BlockElement,
    registry: &Registry,
    format: Format,
    issues: &mut Vec<SerializeIssue>,
) -> String {
    let inner: String = inline
        .children
        .iter()
        .map(|leaf| serialize_leaf(leaf, registry, format))
        .collect();

    match registry.plugin(&inline.plugin_type) {
        Some(plugin) => match plugin.serializer(format) {
            Some(hook) => hook(ElementRef::Inline(inline), &inner),
            None => inner,
        },
        None => {
            let err = UnknownTypeError {
                id: parent.id.clone(),
                plugin_type: inline.plugin_type.clone(),
            };
            log::warn!("{err} (inline); emitting raw text");
            issues.push(SerializeIssue::UnknownType(err));
            inner
        }
    }
}

/// One leaf in `format` syntax, ignoring marks the registry does not know.
pub fn serialize_leaf(leaf: &TextLeaf, registry: &Registry, format: Format) -> String {
    match format {
        Format::Html => html::leaf(leaf, registry),
        Format::Markdown => markdown::leaf(leaf, registry),
    }
}
