use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::render::RenderNode;

/// A text-level attribute.
///
/// Declaration order is the wrapper nesting order used by every serializer:
/// bold is outermost, code innermost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
}

impl Mark {
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strike,
        Mark::Code,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Code => "code",
        }
    }

    pub fn from_name(name: &str) -> Option<Mark> {
        Mark::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Opening and closing Markdown syntax.
    ///
    /// Underline has no Markdown syntax, so it falls back to inline HTML.
    pub fn markdown_delimiters(self) -> (&'static str, &'static str) {
        match self {
            Mark::Bold => ("**", "**"),
            Mark::Italic => ("*", "*"),
            Mark::Underline => ("<u>", "</u>"),
            Mark::Strike => ("~~", "~~"),
            Mark::Code => ("`", "`"),
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of marks carried by one leaf, stored as a bitset.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkSet(u8);

impl MarkSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, mark: Mark) -> bool {
        self.0 & mark.bit() != 0
    }

    pub fn insert(&mut self, mark: Mark) {
        self.0 |= mark.bit();
    }

    pub fn remove(&mut self, mark: Mark) {
        self.0 &= !mark.bit();
    }

    /// Flip `mark`, returning whether it is now set.
    pub fn toggle(&mut self, mark: Mark) -> bool {
        self.0 ^= mark.bit();
        self.contains(mark)
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.insert(mark);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Marks in wrapper order, outermost first.
    pub fn iter(self) -> impl DoubleEndedIterator<Item = Mark> {
        Mark::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::empty();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

impl fmt::Debug for MarkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for MarkSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for MarkSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marks = Vec::<Mark>::deserialize(deserializer)?;
        Ok(marks.into_iter().collect())
    }
}

/// Wraps an already rendered leaf in the mark's presentation.
pub type RenderMarkFn = Arc<dyn Fn(RenderNode) -> RenderNode + Send + Sync>;

/// Declares a mark to the registry: how it renders and which HTML tags are
/// equivalent to it. The first tag is the one emitted by the HTML serializer.
#[derive(Clone)]
pub struct MarkDescriptor {
    pub mark: Mark,
    pub html_tags: Vec<String>,
    pub render: RenderMarkFn,
}

impl MarkDescriptor {
    /// A descriptor whose render hook wraps the leaf in the first HTML tag.
    pub fn new(mark: Mark, html_tags: &[&str]) -> Self {
        let tag = html_tags.first().copied().unwrap_or("span").to_ascii_lowercase();
        Self {
            mark,
            html_tags: html_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            render: Arc::new(move |node| RenderNode::element(&tag, vec![node])),
        }
    }

    pub fn with_render(
        mut self,
        render: impl Fn(RenderNode) -> RenderNode + Send + Sync + 'static,
    ) -> Self {
        self.render = Arc::new(render);
        self
    }

    /// The tag the HTML serializer wraps text in.
    pub fn html_tag(&self) -> &str {
        self.html_tags.first().map(String::as_str).unwrap_or("span")
    }
}

impl fmt::Debug for MarkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkDescriptor")
            .field("mark", &self.mark)
            .field("html_tags", &self.html_tags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_wrapper_order_not_insertion_order() {
        let a: MarkSet = [Mark::Code, Mark::Italic, Mark::Bold].into_iter().collect();
        let b: MarkSet = [Mark::Bold, Mark::Code, Mark::Italic].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(
            a.iter().collect::<Vec<_>>(),
            vec![Mark::Bold, Mark::Italic, Mark::Code]
        );
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = MarkSet::empty();
        assert!(set.toggle(Mark::Strike));
        assert!(set.contains(Mark::Strike));
        assert!(!set.toggle(Mark::Strike));
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_name_list() {
        let set = MarkSet::empty().with(Mark::Underline).with(Mark::Bold);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["bold","underline"]"#);
        let back: MarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn descriptor_emits_first_tag() {
        let d = MarkDescriptor::new(Mark::Bold, &["STRONG", "b"]);
        assert_eq!(d.html_tag(), "strong");
        assert_eq!(d.html_tags, vec!["strong", "b"]);
    }
}
