use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, RenderNode,
};

pub const BLOCKQUOTE: &str = "Blockquote";

pub fn blockquote() -> PluginDescriptor {
    PluginDescriptor::new(BLOCKQUOTE)
        .with_element(
            "blockquote",
            ElementSpec::block(|props| {
                RenderNode::element("blockquote", props.children)
                    .with_attr("class", "blockweave-blockquote")
            }),
        )
        .with_display("Blockquote", "Capture a quote")
        .with_shortcuts(&[">"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["blockquote"])
                .serialize_with(|_, text| format!("<blockquote>{text}</blockquote>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::BlockQuote])
                .serialize_with(|_, text| format!("{}\n\n", quote_lines(text))),
        )
}

/// Prefix every line with `> ` so multi-line quotes stay one quote.
pub(crate) fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_line_is_quoted() {
        assert_eq!(quote_lines("a\n\nb"), "> a\n>\n> b");
    }
}
