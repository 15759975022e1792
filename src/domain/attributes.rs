//! DOT attribute lists.
//!
//! Attribute keys are a closed set so that style blocks, nodes and edges
//! cannot drift into free-form string bags.

/// Attribute keys recognized in generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKey {
    Overlap,
    FontName,
    FontSize,
    FontColor,
    Label,
    Color,
    Style,
    Shape,
}

impl AttrKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrKey::Overlap => "overlap",
            AttrKey::FontName => "fontname",
            AttrKey::FontSize => "fontsize",
            AttrKey::FontColor => "fontcolor",
            AttrKey::Label => "label",
            AttrKey::Color => "color",
            AttrKey::Style => "style",
            AttrKey::Shape => "shape",
        }
    }
}

/// Ordered `(key, value)` pairs; rendering follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrList {
    entries: Vec<(AttrKey, String)>,
}

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: AttrKey, value: impl ToString) -> Self {
        self.entries.push((key, value.to_string()));
        self
    }

    pub fn get(&self, key: AttrKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `key = "value", ...` as used in the graph/node/edge default blocks.
    pub fn to_default_block(&self) -> String {
        self.render(" = ")
    }

    /// `key="value", ...` as used inside node and edge statements.
    pub fn to_inline(&self) -> String {
        self.render("=")
    }

    fn render(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{}{}\"{}\"", key.as_str(), separator, escape_value(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Escape double quotes in a quoted DOT string.
///
/// Backslashes are left alone: labels carry intentional `\n` line breaks.
pub fn escape_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Escape a quoted DOT identifier (function and group names).
pub fn escape_id(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}
