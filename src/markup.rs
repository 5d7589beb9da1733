//! Markup document model.
//!
//! A page is a tree of [`Element`]s described in TOML. Countdown containers
//! and the fields inside them are located by attribute, the same way the
//! widget is configured in HTML.

use crate::error::{markup_error, CountdownResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Attribute marking an element as a countdown container
pub const CONTAINER_ATTRIBUTE: &str = "event-countdown";

/// Attribute written by the pipeline to expose its state
pub const STATE_ATTRIBUTE: &str = "ec-state";

/// Document shared between the countdown pipelines of one page
pub type SharedDocument = Arc<RwLock<Document>>;

fn default_tag() -> String {
    String::from("div")
}

/// A single element of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<Element>,
    /// Text following this element inside its parent
    #[serde(default)]
    pub tail: String,
}

impl Default for Element {
    fn default() -> Self {
        Self::new(default_tag())
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            tail: String::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Replace the inner content with plain text
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.children.clear();
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Replace the inner content with the given elements
    pub fn replace_children(&mut self, children: Vec<Element>) {
        self.text.clear();
        self.children = children;
    }

    /// Concatenated text of this element and its descendants
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
            out.push_str(&child.tail);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attributes {
            if value.is_empty() {
                let _ = write!(out, " {}", name);
            } else {
                let _ = write!(out, " {}=\"{}\"", name, escape(value));
            }
        }
        out.push('>');
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
        out.push_str(&escape(&self.tail));
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn collect<F>(&self, path: ElementPath, predicate: &F, found: &mut Vec<ElementPath>)
    where
        F: Fn(&Element) -> bool,
    {
        if predicate(self) {
            found.push(path.clone());
        }
        for (index, child) in self.children.iter().enumerate() {
            child.collect(path.child(index), predicate, found);
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Position of an element as child indices from the document root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Whether `other` is this path or lies beneath it
    pub fn contains(&self, other: &ElementPath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl std::fmt::Display for ElementPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// A whole page of elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "element", default)]
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Parse a TOML page description
    pub fn from_toml_str(source: &str) -> CountdownResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML page description from disk
    pub fn load(path: impl AsRef<Path>) -> CountdownResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            markup_error(&format!("Failed to read page {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(RwLock::new(self))
    }

    pub fn get(&self, path: &ElementPath) -> Option<&Element> {
        let (first, rest) = path.indices().split_first()?;
        let mut element = self.elements.get(*first)?;
        for index in rest {
            element = element.children.get(*index)?;
        }
        Some(element)
    }

    pub fn get_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        let (first, rest) = path.indices().split_first()?;
        let mut element = self.elements.get_mut(*first)?;
        for index in rest {
            element = element.children.get_mut(*index)?;
        }
        Some(element)
    }

    /// Paths of all elements matching `predicate`, in document order
    pub fn find_all<F>(&self, predicate: F) -> Vec<ElementPath>
    where
        F: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        for (index, element) in self.elements.iter().enumerate() {
            element.collect(ElementPath::root(index), &predicate, &mut found);
        }
        found
    }

    /// Paths of every countdown container on the page
    pub fn containers(&self) -> Vec<ElementPath> {
        self.find_all(|element| element.has_attribute(CONTAINER_ATTRIBUTE))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            element.write_html(&mut out);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
[[element]]
tag = "h1"
text = "Next stream"

[[element]]
tag = "div"
attributes = { event-countdown = "", calendar-id = "team", api-key = "secret" }

[[element.children]]
tag = "a"
text = "loading..."
attributes = { ec-name = "", ec-link = "", href = "/" }

[[element.children]]
tag = "span"
text = "loading..."
attributes = { ec-countdown = "" }
"#;

    #[test]
    fn test_parse_page_from_toml() {
        let document = Document::from_toml_str(PAGE).unwrap();
        assert_eq!(document.elements.len(), 2);
        assert_eq!(document.elements[0].tag, "h1");

        let container = &document.elements[1];
        assert_eq!(container.attribute("calendar-id"), Some("team"));
        assert_eq!(container.children.len(), 2);
        assert!(container.children[0].has_attribute("ec-link"));
    }

    #[test]
    fn test_containers_found_in_document_order() {
        let document = Document::new(vec![
            Element::new("div").with_attribute(CONTAINER_ATTRIBUTE, ""),
            Element::new("section")
                .with_child(Element::new("p"))
                .with_child(Element::new("div").with_attribute(CONTAINER_ATTRIBUTE, "")),
        ]);

        let containers = document.containers();
        assert_eq!(
            containers,
            vec![ElementPath::root(0), ElementPath::root(1).child(1)]
        );
    }

    #[test]
    fn test_get_and_get_mut_follow_paths() {
        let mut document = Document::from_toml_str(PAGE).unwrap();
        let path = ElementPath::root(1).child(1);
        assert_eq!(document.get(&path).unwrap().tag, "span");

        document.get_mut(&path).unwrap().set_text("in 3 hours");
        assert_eq!(document.get(&path).unwrap().text, "in 3 hours");

        assert!(document.get(&ElementPath::root(1).child(9)).is_none());
        assert!(document.get(&ElementPath::default()).is_none());
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut element = Element::new("p").with_child(Element::new("strong").with_text("x"));
        element.set_text("plain");
        assert!(element.children.is_empty());
        assert_eq!(element.text_content(), "plain");
    }

    #[test]
    fn test_to_html_escapes_text_and_attributes() {
        let element = Element::new("a")
            .with_attribute("href", "https://example.com/?a=1&b=\"2\"")
            .with_attribute("ec-link", "")
            .with_text("<Launch & Learn>");

        assert_eq!(
            element.to_html(),
            "<a ec-link href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">&lt;Launch &amp; Learn&gt;</a>"
        );
    }

    #[test]
    fn test_tail_text_follows_element() {
        let element = Element::new("p")
            .with_child(Element::new("strong").with_text("Note").with_tail(" see "))
            .with_child(Element::new("a").with_text("docs").with_tail("."));

        assert_eq!(element.text_content(), "Note see docs.");
        assert_eq!(
            element.to_html(),
            "<p><strong>Note</strong> see <a>docs</a>.</p>"
        );
    }

    #[test]
    fn test_path_containment() {
        let container = ElementPath::root(2);
        assert!(container.contains(&container));
        assert!(container.contains(&container.child(0).child(3)));
        assert!(!container.contains(&ElementPath::root(1)));
        assert_eq!(container.child(4).to_string(), "/2/4");
    }

    #[test]
    fn test_invalid_toml_is_markup_error() {
        let err = Document::from_toml_str("[[element]\ntag = ").unwrap_err();
        assert!(matches!(err, crate::error::Error::Markup(_)));
    }
}
