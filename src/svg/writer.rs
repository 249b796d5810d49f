//! SVG serialization through quick-xml's `Writer`.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::model::{Document, Element, Node};

/// Serialize a document to indented SVG text with an XML declaration.
pub fn serialize(doc: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if let Some(doctype) = &doc.doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
    }
    for comment in &doc.leading_comments {
        writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
    }
    write_element(&mut writer, &doc.root)?;

    let mut text = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    text.push('\n');
    Ok(text)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if is_inline(element) {
        // Indenting mixed content would add text to it.
        let mut inner = Writer::new(Vec::new());
        write_children(&mut inner, element)?;
        writer.get_mut().extend_from_slice(&inner.into_inner());
        writer.write_event(Event::Text(BytesText::new("")))?;
    } else {
        write_children(writer, element)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn is_inline(element: &Element) -> bool {
    let has_text = element
        .children
        .iter()
        .any(|n| matches!(n, Node::Text(_) | Node::CData(_)));
    (has_text || element.preserves_whitespace()) && element.child_elements().next().is_some()
}

fn write_children(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
        }
    }
    Ok(())
}
