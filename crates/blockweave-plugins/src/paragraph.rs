use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, RenderNode,
};

pub const PARAGRAPH: &str = "Paragraph";

/// Plain text; also the type unclaimed markup falls back to.
pub fn paragraph() -> PluginDescriptor {
    PluginDescriptor::new(PARAGRAPH)
        .with_element(
            "paragraph",
            ElementSpec::block(|props| {
                RenderNode::element("p", props.children).with_attr("class", "blockweave-paragraph")
            }),
        )
        .with_display("Paragraph", "Just start writing with plain text.")
        .with_search_string("text paragraph")
        .with_shortcuts(&["p", "text"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["p"])
                .serialize_with(|_, text| format!("<p>{text}</p>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Paragraph])
                .serialize_with(|_, text| format!("{text}\n\n")),
        )
}
