//! # Document Model
//!
//! The in-memory representation of an SVG file. A document is a tree of
//! elements, each with an ordered attribute list and children. The tree is
//! deliberately generic: it knows nothing about which elements draw
//! something. Geometry lives in [`crate::geometry`] and figure-level
//! operations in [`crate::figures`].
//!
//! Everything the parser reads is kept, including elements and attributes
//! this crate never interprets, so a load/save cycle does not drop content.

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A complete SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The `<svg>` root element.
    pub root: Element,

    /// Raw DOCTYPE content (without the `<!DOCTYPE` / `>` delimiters).
    pub doctype: Option<String>,

    /// Comments that appear before the root element.
    pub leading_comments: Vec<String>,
}

/// A single XML attribute. The value is stored unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl Document {
    /// Create an empty drawing of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        let mut root = Element::new("svg");
        root.set_attr("xmlns", SVG_NAMESPACE);
        root.set_attr("width", format_number(width));
        root.set_attr("height", format_number(height));
        root.set_attr(
            "viewBox",
            format!("0 0 {} {}", format_number(width), format_number(height)),
        );
        Self {
            root,
            doctype: None,
            leading_comments: Vec::new(),
        }
    }

    /// Declared width of the root, if it is a plain number.
    pub fn width(&self) -> Option<f64> {
        self.root.attr_f64("width")
    }

    /// Declared height of the root, if it is a plain number.
    pub fn height(&self) -> Option<f64> {
        self.root.attr_f64("height")
    }

    pub fn view_box(&self) -> Option<crate::svg::ViewBox> {
        self.root.attr("viewBox").and_then(crate::svg::parse_view_box)
    }

    /// Find the first element in document order with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.root.id() == Some(id) {
            return Some(&self.root);
        }
        self.root.find_descendant(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.root.id() == Some(id) {
            return Some(&mut self.root);
        }
        self.root.find_descendant_mut(id)
    }

    /// Remove the first element with the given id and return it.
    ///
    /// The root element is never removed; asking for its id returns `None`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        self.root.remove_descendant(id)
    }

    /// Total number of elements below the root.
    pub fn element_count(&self) -> usize {
        self.root.descendant_count()
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Element name without any namespace prefix (`svg:rect` → `rect`).
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Numeric attribute value. A trailing `px` is accepted; any other unit
    /// (or a percentage) makes the value unusable for geometry.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        let raw = self.attr(name)?.trim();
        let raw = raw.strip_suffix("px").unwrap_or(raw);
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Set an attribute, replacing an existing value in place so that
    /// attribute order is stable.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Text content elements, where whitespace between child nodes is drawn.
    pub fn preserves_whitespace(&self) -> bool {
        matches!(self.local_name(), "text" | "tspan" | "textPath")
    }

    /// Iterate over child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of this element's direct children.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    fn find_descendant(&self, id: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.id() == Some(id) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(id) {
                return Some(found);
            }
        }
        None
    }

    fn find_descendant_mut(&mut self, id: &str) -> Option<&mut Element> {
        for child in self.child_elements_mut() {
            if child.id() == Some(id) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(id) {
                return Some(found);
            }
        }
        None
    }

    fn remove_descendant(&mut self, id: &str) -> Option<Element> {
        for i in 0..self.children.len() {
            let hit = matches!(&self.children[i], Node::Element(e) if e.id() == Some(id));
            if hit {
                return match self.children.remove(i) {
                    Node::Element(e) => Some(e),
                    _ => None,
                };
            }
            if let Node::Element(child) = &mut self.children[i] {
                if let Some(found) = child.remove_descendant(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn descendant_count(&self) -> usize {
        self.child_elements()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// Format a number for an attribute value: no trailing zeros, no `-0`.
pub fn format_number(v: f64) -> String {
    format_number_with_precision(v, 6)
}

/// Round to `precision` decimals and trim trailing zeros.
pub fn format_number_with_precision(v: f64, precision: usize) -> String {
    let mut s = format!("{:.*}", precision, v);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new(200.0, 100.0);
        let group = Element::new("g")
            .with_attr("id", "layer")
            .with_child(Element::new("rect").with_attr("id", "inner"))
            .with_child(Element::new("circle").with_attr("id", "dot"));
        doc.root.children.push(Node::Element(group));
        doc.root
            .children
            .push(Node::Element(Element::new("rect").with_attr("id", "dot")));
        doc
    }

    #[test]
    fn test_new_document_has_size_and_view_box() {
        let doc = Document::new(200.0, 100.5);
        assert_eq!(doc.root.attr("xmlns"), Some(SVG_NAMESPACE));
        assert_eq!(doc.root.attr("width"), Some("200"));
        assert_eq!(doc.root.attr("height"), Some("100.5"));
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 200 100.5"));
        let vb = doc.view_box().unwrap();
        assert!((vb.width - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("rect")
            .with_attr("x", "1")
            .with_attr("y", "2");
        el.set_attr("x", "5");
        assert_eq!(el.attributes[0].name, "x");
        assert_eq!(el.attributes[0].value, "5");
        assert_eq!(el.attributes.len(), 2);
    }

    #[test]
    fn test_attr_f64_units() {
        let el = Element::new("rect")
            .with_attr("x", "12px")
            .with_attr("y", "50%")
            .with_attr("width", " 3.5 ");
        assert_eq!(el.attr_f64("x"), Some(12.0));
        assert_eq!(el.attr_f64("y"), None);
        assert_eq!(el.attr_f64("width"), Some(3.5));
        assert_eq!(el.attr_f64("height"), None);
    }

    #[test]
    fn test_find_by_id_is_document_order() {
        let doc = sample();
        let found = doc.find_by_id("dot").unwrap();
        assert_eq!(found.name, "circle");
    }

    #[test]
    fn test_remove_by_id_takes_first_match() {
        let mut doc = sample();
        let removed = doc.remove_by_id("dot").unwrap();
        assert_eq!(removed.name, "circle");
        let remaining = doc.find_by_id("dot").unwrap();
        assert_eq!(remaining.name, "rect");
        assert_eq!(doc.element_count(), 3);
    }

    #[test]
    fn test_remove_root_id_is_refused() {
        let mut doc = sample();
        doc.root.set_attr("id", "canvas");
        assert!(doc.remove_by_id("canvas").is_none());
        assert!(doc.find_by_id("canvas").is_some());
    }

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(Element::new("svg:rect").local_name(), "rect");
        assert_eq!(Element::new("path").local_name(), "path");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number_with_precision(1.23456, 3), "1.235");
        assert_eq!(format_number_with_precision(2.5000, 3), "2.5");
        assert_eq!(format_number_with_precision(-0.0001, 3), "0");
    }
}
