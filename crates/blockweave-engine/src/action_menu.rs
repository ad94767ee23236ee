//! Searchable index over plugin display metadata, consumed by slash-command
//! menus.
//!
//! Matching is a case-insensitive substring test against the label and the
//! optional search string. Results are ranked label-prefix, then
//! label-substring, then search-string-only; ties keep registration order.

use serde::{Deserialize, Serialize};

use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMenuItem {
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_string: Option<String>,
    /// Shortcut strings (`##`, `-`, ...) that select this entry directly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortcuts: Vec<String>,
}

impl ActionMenuItem {
    pub fn new(plugin_type: &str, label: &str) -> Self {
        Self {
            plugin_type: plugin_type.to_string(),
            label: label.to_string(),
            description: String::new(),
            icon: None,
            search_string: None,
            shortcuts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_search_string(mut self, search: &str) -> Self {
        self.search_string = Some(search.to_string());
        self
    }

    fn rank(&self, needle: &str) -> Option<u8> {
        let label = self.label.to_lowercase();
        if label.starts_with(needle) {
            return Some(0);
        }
        if label.contains(needle) {
            return Some(1);
        }
        self.search_string
            .as_ref()
            .filter(|s| s.to_lowercase().contains(needle))
            .map(|_| 2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMenuIndex {
    items: Vec<ActionMenuItem>,
}

impl ActionMenuIndex {
    /// One entry per registered block plugin, labelled by its display title.
    /// Plugins without a title (and inline plugins) are not listed.
    pub fn from_registry(registry: &Registry) -> Self {
        let items = registry
            .plugins()
            .iter()
            .filter(|p| p.node_kind() == crate::plugin::NodeKind::Block)
            .filter(|p| !p.display().title.is_empty())
            .map(|p| {
                let display = p.display();
                ActionMenuItem {
                    plugin_type: p.plugin_type().to_string(),
                    label: display.title.clone(),
                    description: display.description.clone(),
                    icon: display.icon.clone(),
                    search_string: display.search_string.clone(),
                    shortcuts: p.shortcuts().to_vec(),
                }
            })
            .collect();
        Self { items }
    }

    /// Host-supplied entries, used as given.
    pub fn from_items(items: Vec<ActionMenuItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ActionMenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn query(&self, term: &str) -> Vec<&ActionMenuItem> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        let mut hits: Vec<(u8, &ActionMenuItem)> = self
            .items
            .iter()
            .filter_map(|item| item.rank(&needle).map(|rank| (rank, item)))
            .collect();
        // Stable sort keeps registration order within a rank.
        hits.sort_by_key(|(rank, _)| *rank);
        hits.into_iter().map(|(_, item)| item).collect()
    }

    pub fn find_by_shortcut(&self, shortcut: &str) -> Option<&ActionMenuItem> {
        self.items
            .iter()
            .find(|item| item.shortcuts.iter().any(|s| s == shortcut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixture_registry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn index() -> ActionMenuIndex {
        ActionMenuIndex::from_items(vec![
            ActionMenuItem::new("Paragraph", "Paragraph").with_search_string("text paragraph"),
            ActionMenuItem::new("HeadingOne", "Heading 1").with_search_string("h1 title"),
            ActionMenuItem::new("HeadingTwo", "Heading 2").with_search_string("h2 subtitle"),
            ActionMenuItem::new("Callout", "Callout").with_search_string("note heading"),
            ActionMenuItem::new("Blockquote", "Blockquote").with_search_string("quote"),
        ])
    }

    fn labels<'a>(items: &[&'a ActionMenuItem]) -> Vec<&'a str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[rstest]
    #[case::search_string("h2", vec!["Heading 2"])]
    #[case::prefix_before_search_only("head", vec!["Heading 1", "Heading 2", "Callout"])]
    #[case::substring_before_search_only("quote", vec!["Blockquote"])]
    #[case::case_insensitive("PARA", vec!["Paragraph"])]
    #[case::no_match("zzz", vec![])]
    fn query_ranks_matches(#[case] term: &str, #[case] expected: Vec<&str>) {
        assert_eq!(labels(&index().query(term)), expected);
    }

    #[test]
    fn label_substring_ranks_above_search_string() {
        let index = ActionMenuIndex::from_items(vec![
            ActionMenuItem::new("Embed", "Embed").with_search_string("video iframe"),
            ActionMenuItem::new("Video", "Video"),
            ActionMenuItem::new("Upload", "Upload a video"),
        ]);
        assert_eq!(
            labels(&index.query("video")),
            vec!["Video", "Upload a video", "Embed"]
        );
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        assert_eq!(index().query("  ").len(), 5);
        assert_eq!(index().query("")[0].label, "Paragraph");
    }

    #[test]
    fn registry_index_lists_block_plugins_with_titles() {
        let index = ActionMenuIndex::from_registry(&fixture_registry());
        let types: Vec<&str> = index.items().iter().map(|i| i.plugin_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["Paragraph", "HeadingTwo", "BulletedList", "Image", "Code"]
        );
        assert_eq!(
            index.query("h2")[0].search_string.as_deref(),
            Some("h2 subtitle")
        );
        assert_eq!(
            index.find_by_shortcut("##").map(|i| i.plugin_type.as_str()),
            Some("HeadingTwo")
        );
        assert!(index.find_by_shortcut("???").is_none());
    }
}
