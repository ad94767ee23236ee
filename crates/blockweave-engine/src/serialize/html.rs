//! HTML syntax for text leaves.

use crate::registry::Registry;
use crate::schema::TextLeaf;

/// Escaped leaf text wrapped in each registered mark's tag, bold outermost.
/// Newlines become `<br>`.
pub fn leaf(leaf: &TextLeaf, registry: &Registry) -> String {
    let mut out = escape_text(&leaf.text);
    for mark in leaf.marks.iter().rev() {
        if let Some(descriptor) = registry.mark(mark) {
            let tag = descriptor.html_tag();
            out = format!("<{tag}>{out}</{tag}>");
        }
    }
    out
}

pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>")
}

/// Attribute value escaping for plugin serializers.
pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::schema::{Mark, MarkDescriptor, MarkSet};
    use crate::tests::fixture_registry;
    use rstest::rstest;

    #[rstest]
    #[case::bold_then_italic(&[Mark::Bold, Mark::Italic])]
    #[case::italic_then_bold(&[Mark::Italic, Mark::Bold])]
    fn nesting_is_independent_of_toggle_order(#[case] toggles: &[Mark]) {
        let registry = fixture_registry();
        let mut marks = MarkSet::empty();
        for mark in toggles {
            marks.toggle(*mark);
        }
        assert_eq!(
            leaf(&TextLeaf::marked("x", marks), &registry),
            "<strong><em>x</em></strong>"
        );
    }

    #[test]
    fn all_marks_nest_in_fixed_order() {
        let registry = fixture_registry();
        let marks: MarkSet = Mark::ALL.into_iter().rev().collect();
        assert_eq!(
            leaf(&TextLeaf::marked("x", marks), &registry),
            "<strong><em><u><s><code>x</code></s></u></em></strong>"
        );
    }

    #[test]
    fn unregistered_marks_are_ignored() {
        let registry =
            Registry::build(vec![], vec![MarkDescriptor::new(Mark::Italic, &["em"])]).unwrap();
        let marks = MarkSet::empty().with(Mark::Bold).with(Mark::Italic);
        assert_eq!(leaf(&TextLeaf::marked("x", marks), &registry), "<em>x</em>");
    }

    #[test]
    fn newlines_become_line_breaks() {
        let registry = fixture_registry();
        assert_eq!(leaf(&TextLeaf::plain("a\nb"), &registry), "a<br>b");
    }
}
