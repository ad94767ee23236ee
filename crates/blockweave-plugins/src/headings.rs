//! HeadingOne, HeadingTwo and HeadingThree.
//!
//! The three plugins differ only in level, so they are built from one table.

use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, RenderNode,
};

pub const HEADING_ONE: &str = "HeadingOne";
pub const HEADING_TWO: &str = "HeadingTwo";
pub const HEADING_THREE: &str = "HeadingThree";

struct Level {
    plugin_type: &'static str,
    element: &'static str,
    level: u8,
    title: &'static str,
    description: &'static str,
    search: &'static str,
}

const LEVELS: [Level; 3] = [
    Level {
        plugin_type: HEADING_ONE,
        element: "heading-one",
        level: 1,
        title: "Heading 1",
        description: "Big section heading",
        search: "h1 title",
    },
    Level {
        plugin_type: HEADING_TWO,
        element: "heading-two",
        level: 2,
        title: "Heading 2",
        description: "Medium section heading",
        search: "h2 subtitle",
    },
    Level {
        plugin_type: HEADING_THREE,
        element: "heading-three",
        level: 3,
        title: "Heading 3",
        description: "Small section heading",
        search: "h3 subsubtitle small heading",
    },
];

fn heading(level: &Level) -> PluginDescriptor {
    let n = level.level;
    let tag = format!("h{n}");
    let hashes = "#".repeat(usize::from(n));
    let class = format!("blockweave-{}", level.element);
    let render_tag = tag.clone();
    let html_tag = tag.clone();
    let md_prefix = hashes.clone();

    PluginDescriptor::new(level.plugin_type)
        .with_element(
            level.element,
            ElementSpec::block(move |props| {
                RenderNode::element(&render_tag, props.children).with_attr("class", class.as_str())
            }),
        )
        .with_display(level.title, level.description)
        .with_search_string(level.search)
        .with_shortcuts(&[tag.as_str(), hashes.as_str()])
        .with_html(
            HtmlParser::new()
                .match_tags(&[tag.as_str()])
                .serialize_with(move |_, text| format!("<{html_tag}>{text}</{html_tag}>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Heading(n)])
                .serialize_with(move |_, text| format!("{md_prefix} {text}\n")),
        )
}

pub fn heading_one() -> PluginDescriptor {
    heading(&LEVELS[0])
}

pub fn heading_two() -> PluginDescriptor {
    heading(&LEVELS[1])
}

pub fn heading_three() -> PluginDescriptor {
    heading(&LEVELS[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockweave_engine::{BlockElement, ElementRef, Format};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(heading_one(), "<h1>T</h1>", "# T\n")]
    #[case(heading_two(), "<h2>T</h2>", "## T\n")]
    #[case(heading_three(), "<h3>T</h3>", "### T\n")]
    fn serializers_follow_level(
        #[case] plugin: PluginDescriptor,
        #[case] html: &str,
        #[case] markdown: &str,
    ) {
        let block = BlockElement::with_text(plugin.plugin_type(), "T");
        let el = ElementRef::Block(&block);
        let to_html = plugin.serializer(Format::Html).unwrap();
        let to_markdown = plugin.serializer(Format::Markdown).unwrap();
        assert_eq!(to_html(el, "T"), html);
        assert_eq!(to_markdown(el, "T"), markdown);
    }

    #[test]
    fn shortcuts_cover_tag_and_hashes() {
        assert_eq!(heading_three().shortcuts(), ["h3", "###"]);
    }
}
