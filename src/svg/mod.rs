//! # SVG Reader
//!
//! Parses SVG text into the [`Document`] tree using quick-xml's pull reader,
//! and provides the file-level `load`/`save` wrappers. Whitespace-only text
//! between tags is dropped, except inside `<text>` content where it is part
//! of what gets drawn. Serialization lives in [`writer`], path data in
//! [`path`].

pub mod path;
pub mod writer;

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Result, SvgError};
use crate::model::{Attribute, Document, Element, Node};

pub use writer::serialize;

/// A parsed SVG viewBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parse a viewBox string like "0 0 100 100" or "0,0,100,100".
pub fn parse_view_box(s: &str) -> Option<ViewBox> {
    let parts: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    if parts.len() == 4 {
        Some(ViewBox {
            min_x: parts[0],
            min_y: parts[1],
            width: parts[2],
            height: parts[3],
        })
    } else {
        None
    }
}

/// Read and parse an SVG file.
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SvgError::io(path, e))?;
    let doc = parse(&text)?;
    debug!(
        path = %path.display(),
        elements = doc.element_count(),
        "loaded document"
    );
    Ok(doc)
}

/// Serialize a document and write it to disk.
pub fn save(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = serialize(doc)?;
    fs::write(path, text).map_err(|e| SvgError::io(path, e))?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

/// Parse SVG XML content into a document tree.
pub fn parse(content: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content);

    let mut doctype = None;
    let mut leading_comments = Vec::new();
    let mut root: Option<Element> = None;
    // Elements that have been opened but not yet closed.
    let mut stack: Vec<Element> = Vec::new();

    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(e) => {
                check_single_root(&root, &stack, position)?;
                stack.push(element_from_start(&e)?);
            }
            Event::Empty(e) => {
                check_single_root(&root, &stack, position)?;
                let element = element_from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                // quick-xml has already verified the end name matches.
                let element = stack.pop().ok_or_else(|| SvgError::Parse {
                    position,
                    message: "unexpected end tag".to_string(),
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                let blank = text.trim().is_empty();
                match stack.last_mut() {
                    // Indentation between tags is not content, except inside
                    // text elements where it renders as a space.
                    Some(parent) if blank && !parent.preserves_whitespace() => {}
                    Some(parent) => parent.children.push(Node::Text(text)),
                    None if blank => {}
                    None => {
                        return Err(SvgError::Parse {
                            position,
                            message: "text outside the root element".to_string(),
                        })
                    }
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::CData(text));
                }
            }
            Event::Comment(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Comment(text)),
                    None if root.is_none() => leading_comments.push(text),
                    None => {}
                }
            }
            Event::DocType(d) => {
                doctype = Some(String::from_utf8_lossy(&d).trim().to_string());
            }
            Event::Eof => break,
            // XML declaration and processing instructions are regenerated
            // or dropped on output.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(SvgError::Parse {
            position: reader.buffer_position() as u64,
            message: format!("element <{}> is never closed", open.name),
        });
    }

    let root = root.ok_or_else(|| SvgError::Parse {
        position: 0,
        message: "no root element".to_string(),
    })?;
    if root.local_name() != "svg" {
        return Err(SvgError::NotSvg { found: root.name });
    }

    Ok(Document {
        root,
        doctype,
        leading_comments,
    })
}

fn check_single_root(root: &Option<Element>, stack: &[Element], position: u64) -> Result<()> {
    if root.is_some() && stack.is_empty() {
        return Err(SvgError::Parse {
            position,
            message: "content after the root element".to_string(),
        });
    }
    Ok(())
}

fn element_from_start(e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        attributes.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_box() {
        let vb = parse_view_box("0 0 100 200").unwrap();
        assert!((vb.min_x - 0.0).abs() < 0.001);
        assert!((vb.width - 100.0).abs() < 0.001);
        assert!((vb.height - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_view_box_commas() {
        let vb = parse_view_box("-10,5, 50,60").unwrap();
        assert!((vb.min_x + 10.0).abs() < 0.001);
        assert!((vb.min_y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_view_box_invalid() {
        assert!(parse_view_box("bad").is_none());
        assert!(parse_view_box("0 0 10").is_none());
        assert!(parse_view_box("0 0 10 x").is_none());
    }

    #[test]
    fn test_parse_tree() {
        let doc = parse(
            r##"<?xml version="1.0"?>
<!-- drawn by hand -->
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
  <g id="layer">
    <rect id="box" x="10" y="20" width="30" height="10" fill="#ff0000"/>
  </g>
  <text x="5" y="5">A &amp; B</text>
</svg>"##,
        )
        .unwrap();
        assert_eq!(doc.leading_comments, vec![" drawn by hand ".to_string()]);
        assert_eq!(doc.root.name, "svg");
        assert_eq!(doc.width(), Some(100.0));
        let rect = doc.find_by_id("box").unwrap();
        assert_eq!(rect.attr("fill"), Some("#ff0000"));
        let text = doc.root.child_elements().nth(1).unwrap();
        assert_eq!(text.text_content(), "A & B");
    }

    #[test]
    fn test_parse_keeps_unknown_content() {
        let doc = parse(
            r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><inkscape:grid spacing="4"/><![CDATA[raw <data>]]></svg>"#,
        )
        .unwrap();
        let grid = doc.root.child_elements().next().unwrap();
        assert_eq!(grid.name, "inkscape:grid");
        assert_eq!(grid.attr("spacing"), Some("4"));
        assert!(matches!(&doc.root.children[1], Node::CData(t) if t == "raw <data>"));
    }

    #[test]
    fn test_parse_doctype() {
        let doc = parse(
            r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"><svg/>"#,
        )
        .unwrap();
        assert!(doc.doctype.unwrap().starts_with("svg PUBLIC"));
    }

    #[test]
    fn test_non_svg_root() {
        let err = parse("<html><body/></html>").unwrap_err();
        assert!(matches!(err, SvgError::NotSvg { ref found } if found == "html"));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = parse("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, SvgError::Xml { .. }));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<svg><g>").unwrap_err();
        assert!(
            matches!(err, SvgError::Parse { ref message, .. } if message.contains("<g>") || message.contains("<svg>"))
                || matches!(err, SvgError::Xml { .. })
        );
    }

    #[test]
    fn test_second_root_rejected() {
        let err = parse("<svg/><svg/>").unwrap_err();
        assert!(matches!(err, SvgError::Parse { .. }));
    }

    #[test]
    fn test_empty_input() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, SvgError::Parse { ref message, .. } if message == "no root element"));
    }

    #[test]
    fn test_namespaced_root_is_svg() {
        let doc = parse(r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert_eq!(doc.root.local_name(), "svg");
    }
}
