use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, RenderNode,
};

use crate::attrs::{attr, attrs_to_props};

pub const LINK: &str = "Link";

/// Inline hyperlink carrying `url` and an optional `title`.
pub fn link() -> PluginDescriptor {
    PluginDescriptor::new(LINK)
        .with_element(
            "link",
            ElementSpec::inline(|props| {
                let url = props.element.property_str("url").unwrap_or_default();
                let mut node = RenderNode::element("a", props.children)
                    .with_attr("href", url)
                    .with_attr("class", "blockweave-link");
                if let Some(target) = props.element.property_str("target") {
                    node = node.with_attr("target", target);
                }
                if let Some(rel) = props.element.property_str("rel") {
                    node = node.with_attr("rel", rel);
                }
                node
            })
            .with_default_prop("target", "_blank")
            .with_default_prop("rel", "noreferrer"),
        )
        .with_display("Link", "Hyperlink")
        .with_html(
            HtmlParser::new()
                .match_tags(&["a"])
                .parse_with(|el| {
                    attrs_to_props(
                        el,
                        &[
                            ("href", "url"),
                            ("title", "title"),
                            ("target", "target"),
                            ("rel", "rel"),
                        ],
                    )
                })
                .serialize_with(|el, text| {
                    format!(
                        "<a{}{}{}{}>{text}</a>",
                        attr("href", el.property_str("url")),
                        attr("title", el.property_str("title")),
                        attr("target", el.property_str("target")),
                        attr("rel", el.property_str("rel")),
                    )
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Link])
                .serialize_with(|el, text| {
                    let url = markdown_destination(el.property_str("url").unwrap_or_default());
                    match el.property_str("title") {
                        Some(title) => format!("[{text}]({url} \"{}\")", title.replace('"', "\\\"")),
                        None => format!("[{text}]({url})"),
                    }
                }),
        )
}

/// Destinations with spaces or parentheses need the `<...>` form.
fn markdown_destination(url: &str) -> String {
    if url.contains([' ', '(', ')']) {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}
