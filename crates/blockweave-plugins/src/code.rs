//! Code blocks. Content is kept verbatim: HTML input is read as plain text
//! and both serializers write the block's raw text rather than the
//! mark-escaped inner text.

use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, Properties,
    RenderNode,
};
use serde_json::Value;

pub const CODE: &str = "Code";

pub fn code() -> PluginDescriptor {
    PluginDescriptor::new(CODE)
        .with_element(
            "code",
            ElementSpec::block(|props| {
                let text = props.element.text();
                let mut code = RenderNode::element("code", vec![RenderNode::text(text)]);
                if let Some(language) = props.element.property_str("language") {
                    code = code.with_attr("class", format!("language-{language}"));
                }
                RenderNode::element("pre", vec![code]).with_attr("class", "blockweave-code")
            }),
        )
        .with_display("Code", "Write bugs.")
        .with_search_string("hello world bug")
        .with_shortcuts(&["```"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["pre"])
                .plain_text()
                .parse_with(|el| {
                    let mut props = Properties::new();
                    let language = std::iter::once(el)
                        .chain(el.element_children())
                        .flat_map(|e| e.classes())
                        .find_map(|class| class.strip_prefix("language-"));
                    if let Some(language) = language {
                        props.insert("language".into(), Value::from(language));
                    }
                    props
                })
                .serialize_with(|el, _| {
                    let text = html_escape::encode_text(&el.text()).into_owned();
                    match el.property_str("language") {
                        Some(language) => format!(
                            "<pre><code class=\"language-{}\">{text}</code></pre>",
                            html_escape::encode_double_quoted_attribute(language)
                        ),
                        None => format!("<pre><code>{text}</code></pre>"),
                    }
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::CodeBlock])
                .serialize_with(|el, _| {
                    let text = el.text();
                    let fence = fence_for(&text);
                    let language = el.property_str("language").unwrap_or_default();
                    format!("{fence}{language}\n{text}\n{fence}\n\n")
                }),
        )
}

/// A backtick fence longer than any backtick run inside `text`.
fn fence_for(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockweave_engine::{BlockElement, ElementRef, Format};
    use pretty_assertions::assert_eq;

    #[test]
    fn fence_outgrows_embedded_fences() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("```inner```"), "````");
    }

    #[test]
    fn html_escapes_raw_text_once() {
        let block =
            BlockElement::with_text(CODE, "if a < b {}").with_property("language", "rust");
        let html = code().serializer(Format::Html).unwrap()(ElementRef::Block(&block), "ignored");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">if a &lt; b {}</code></pre>"
        );
    }

    #[test]
    fn render_keeps_text_unmarked() {
        let block = BlockElement::with_text(CODE, "*x*");
        let plugin = code();
        let (kind, spec) = plugin.root_element().unwrap();
        let node = (spec.render)(blockweave_engine::RenderProps {
            element: ElementRef::Block(&block),
            element_kind: kind,
            children: vec![],
            options: plugin.options(),
        });
        assert_eq!(node.to_html(), "<pre class=\"blockweave-code\"><code>*x*</code></pre>");
    }
}
