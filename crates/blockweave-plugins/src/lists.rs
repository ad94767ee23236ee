//! List plugins. Each list item is its own block; consecutive items of the
//! same type form one visual list.
//!
//! | type         | HTML                          | Markdown   |
//! |--------------|-------------------------------|------------|
//! | NumberedList | `<ol><li>`                    | `1. text`  |
//! | BulletedList | `<ul><li>`                    | `- text`   |
//! | TodoList     | `<ul class="..."><li><input>` | `- [x] text` |

use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, Properties,
    RenderNode,
};
use serde_json::Value;

pub const NUMBERED_LIST: &str = "NumberedList";
pub const BULLETED_LIST: &str = "BulletedList";
pub const TODO_LIST: &str = "TodoList";
pub const TODO_CLASS: &str = "blockweave-todo-list";

pub fn numbered_list() -> PluginDescriptor {
    PluginDescriptor::new(NUMBERED_LIST)
        .with_element(
            "numbered-list",
            ElementSpec::block(|props| {
                RenderNode::element("ol", vec![RenderNode::element("li", props.children)])
                    .with_attr("class", "blockweave-numbered-list")
            }),
        )
        .with_display("NumberedList", "Create a list with numbering.")
        .with_search_string("numbered ordered list")
        .with_shortcuts(&["1."])
        .with_html(
            HtmlParser::new()
                .match_tags(&["ol"])
                .serialize_with(|_, text| format!("<ol><li>{text}</li></ol>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::NumberedItem])
                .serialize_with(|_, text| format!("1. {}\n", indent_continuation(text, 3)))
                .continues_lazily(),
        )
}

pub fn bulleted_list() -> PluginDescriptor {
    PluginDescriptor::new(BULLETED_LIST)
        .with_element(
            "bulleted-list",
            ElementSpec::block(|props| {
                RenderNode::element("ul", vec![RenderNode::element("li", props.children)])
                    .with_attr("class", "blockweave-bulleted-list")
            }),
        )
        .with_display("BulletedList", "Create a simple bulleted list.")
        .with_search_string("bulleted unordered list")
        .with_shortcuts(&["-", "*"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["ul"])
                .serialize_with(|_, text| format!("<ul><li>{text}</li></ul>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::BulletItem])
                .serialize_with(|_, text| format!("- {}\n", indent_continuation(text, 2)))
                .continues_lazily(),
        )
}

pub fn todo_list() -> PluginDescriptor {
    PluginDescriptor::new(TODO_LIST)
        .with_element(
            "todo-list",
            ElementSpec::block(|props| {
                let mut checkbox = RenderNode::element("input", vec![])
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if props.element.property_bool("checked") {
                    checkbox = checkbox.with_attr("checked", "");
                }
                let mut children = vec![checkbox];
                children.extend(props.children);
                RenderNode::element("div", children).with_attr("class", TODO_CLASS)
            })
            .with_default_prop("checked", false),
        )
        .with_display("TodoList", "Track tasks with a to-do list.")
        .with_search_string("todo check list")
        .with_shortcuts(&["[]"])
        .with_html(
            HtmlParser::new()
                .match_classes(&[TODO_CLASS])
                .parse_with(|el| {
                    let checked = std::iter::once(el)
                        .chain(el.element_children())
                        .any(|e| e.name == "input" && e.attr("checked").is_some());
                    let mut props = Properties::new();
                    props.insert("checked".into(), Value::Bool(checked));
                    props
                })
                .serialize_with(|el, text| {
                    let checked = if el.property_bool("checked") {
                        " checked"
                    } else {
                        ""
                    };
                    format!(
                        "<ul class=\"{TODO_CLASS}\"><li><input type=\"checkbox\"{checked}>{text}</li></ul>"
                    )
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::TaskItem])
                .serialize_with(|el, text| {
                    let mark = if el.property_bool("checked") { 'x' } else { ' ' };
                    format!("- [{mark}] {}\n", indent_continuation(text, 2))
                })
                .continues_lazily(),
        )
}

/// Indent every line after the first so it stays inside the list item.
fn indent_continuation(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.replace('\n', &format!("\n{pad}"))
}
