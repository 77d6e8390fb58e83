//! Owned, mutable XML element tree.
//!
//! Documents are parsed into a tree of [`Element`]s, mutated in place,
//! and serialized back. Namespace declarations are captured per element
//! in document order and re-emitted by the serializer; child elements
//! inherit their parent's namespace context so qualified names resolve
//! locally. Mixed content is kept positionally: text before the first
//! child lives on the element, text after a child lives on that child
//! as tail text.

use crate::error::{Error, Result};
use crate::xml::namespace::{NamespaceContext, QualifiedName};
use quick_xml::events::{BytesStart, Event};

/// An XML element with attributes, text content and child elements.
#[derive(Debug, Clone)]
pub struct Element {
    tag_name: String,
    qualified_name: QualifiedName,
    /// Namespace declarations made on this element, in document order.
    declarations: Vec<(String, String)>,
    /// Regular attributes in document order.
    attributes: Vec<(String, String)>,
    namespace_context: NamespaceContext,
    text_content: String,
    /// Text following this element's end tag, inside the parent.
    tail: String,
    children: Vec<Element>,
}

impl Element {
    /// Create a new element with the well-known ODF prefix table as its
    /// namespace context.
    pub fn new(tag_name: &str) -> Self {
        Self::new_with_context(tag_name, NamespaceContext::default())
    }

    /// Create a new element with an explicit namespace context.
    pub fn new_with_context(tag_name: &str, namespace_context: NamespaceContext) -> Self {
        let qualified_name = namespace_context.parse_qualified_name(tag_name);
        Self {
            tag_name: tag_name.to_string(),
            qualified_name,
            declarations: Vec::new(),
            attributes: Vec::new(),
            namespace_context,
            text_content: String::new(),
            tail: String::new(),
            children: Vec::new(),
        }
    }

    /// Get the tag name as written in the document.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Get the local name (without namespace prefix).
    pub fn local_name(&self) -> &str {
        &self.qualified_name.local_name
    }

    /// Get the resolved namespace URI, if any.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.qualified_name.namespace_uri.as_deref()
    }

    /// Check whether this element's name matches `name`, namespace-aware.
    pub fn name_matches(&self, name: &str) -> bool {
        let other = self.namespace_context.parse_qualified_name(name);
        self.qualified_name.matches(&other)
    }

    /// Get the namespace context in effect for this element.
    pub fn namespace_context(&self) -> &NamespaceContext {
        &self.namespace_context
    }

    /// Get an attribute value by its qualified name as written.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        // Exact match first, then namespace-aware comparison so
        // alternative prefixes for the same URI still resolve.
        if let Some((_, value)) = self.attributes.iter().find(|(k, _)| k == name) {
            return Some(value);
        }

        let wanted = self.namespace_context.parse_qualified_name(name);
        self.attributes
            .iter()
            .find(|(k, _)| {
                self.namespace_context
                    .parse_qualified_name(k)
                    .matches(&wanted)
            })
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Get the direct text content of this element.
    pub fn text(&self) -> &str {
        &self.text_content
    }

    /// Set the direct text content of this element.
    pub fn set_text(&mut self, text: &str) {
        self.text_content = text.to_string();
    }

    /// Get the text following this element's end tag inside its parent.
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Get the child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Get the child elements mutably.
    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// Append a child element.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find the first direct child matching `name` (namespace-aware).
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name_matches(name))
    }

    /// Find the first direct child matching `name`, mutably.
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name_matches(name))
    }

    /// Visit every descendant element (including self) matching `name`.
    pub fn for_each_named<'a>(&'a self, name: &str, f: &mut impl FnMut(&'a Element)) {
        if self.name_matches(name) {
            f(self);
        }
        for child in &self.children {
            child.for_each_named(name, f);
        }
    }

    /// Visit every descendant element (including self) matching `name`,
    /// with mutable access.
    pub fn for_each_named_mut(&mut self, name: &str, f: &mut impl FnMut(&mut Element)) {
        if self.name_matches(name) {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_named_mut(name, f);
        }
    }

    /// Parse a document from XML bytes, returning the root element.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let element = Self::from_start_event(e, stack.last())?;
                    stack.push(element);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start_event(e, stack.last())?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        // Degenerate but legal: the whole document is one
                        // self-closing element.
                        None => return Ok(element),
                    }
                },
                Ok(Event::Text(ref t)) => {
                    let raw = String::from_utf8(t.to_vec()).map_err(|_| {
                        Error::InvalidFormat("Invalid UTF-8 in text content".to_string())
                    })?;
                    let text = quick_xml::escape::unescape(&raw).map_err(|e| {
                        Error::InvalidFormat(format!("Invalid character reference: {}", e))
                    })?;
                    append_text(&mut stack, &text);
                },
                Ok(Event::CData(ref t)) => {
                    let text = String::from_utf8(t.to_vec()).map_err(|_| {
                        Error::InvalidFormat("Invalid UTF-8 in CDATA content".to_string())
                    })?;
                    append_text(&mut stack, &text);
                },
                Ok(Event::GeneralRef(ref r)) => {
                    let name = String::from_utf8(r.to_vec()).map_err(|_| {
                        Error::InvalidFormat("Invalid UTF-8 in entity reference".to_string())
                    })?;
                    let resolved = match r.resolve_char_ref().map_err(|e| {
                        Error::InvalidFormat(format!("Invalid character reference: {}", e))
                    })? {
                        Some(ch) => ch.to_string(),
                        None => quick_xml::escape::resolve_predefined_entity(&name)
                            .map(str::to_string)
                            .ok_or_else(|| {
                                Error::InvalidFormat(format!(
                                    "Unresolvable entity reference: &{};",
                                    name
                                ))
                            })?,
                    };
                    append_text(&mut stack, &resolved);
                },
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(element);
                        } else {
                            return Ok(element);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::InvalidFormat(format!("XML parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Err(Error::InvalidFormat("No root element found".to_string()))
    }

    /// Build an element from a start (or empty) tag, inheriting the
    /// parent's namespace context.
    fn from_start_event(e: &BytesStart, parent: Option<&Element>) -> Result<Self> {
        let tag_name = String::from_utf8(e.name().as_ref().to_vec())
            .map_err(|_| Error::InvalidFormat("Invalid UTF-8 in tag name".to_string()))?;

        let mut namespace_context = parent
            .map(|p| p.namespace_context.clone())
            .unwrap_or_default();

        let mut declarations = Vec::new();
        let mut attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|e| Error::InvalidFormat(format!("Invalid attribute: {}", e)))?;
            let key = String::from_utf8(attr.key.as_ref().to_vec())
                .map_err(|_| Error::InvalidFormat("Invalid UTF-8 in attribute key".to_string()))?;
            let raw_value = String::from_utf8(attr.value.to_vec()).map_err(|_| {
                Error::InvalidFormat("Invalid UTF-8 in attribute value".to_string())
            })?;
            let value = quick_xml::escape::unescape(&raw_value)
                .map_err(|e| Error::InvalidFormat(format!("Invalid character reference: {}", e)))?
                .into_owned();

            if key == "xmlns" || key.starts_with("xmlns:") {
                namespace_context.add_declaration(&key, &value);
                declarations.push((key, value));
            } else {
                attributes.push((key, value));
            }
        }

        let qualified_name = namespace_context.parse_qualified_name(&tag_name);
        Ok(Self {
            tag_name,
            qualified_name,
            declarations,
            attributes,
            namespace_context,
            text_content: String::new(),
            tail: String::new(),
            children: Vec::new(),
        })
    }

    /// Serialize this element (and its subtree) to an XML string.
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::new();
        self.write_xml(&mut xml);
        xml
    }

    /// Serialize as a complete document with an XML declaration.
    pub fn to_document_string(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        self.write_xml(&mut xml);
        xml
    }

    fn write_xml(&self, output: &mut String) {
        output.push('<');
        output.push_str(&self.tag_name);

        for (key, value) in self.declarations.iter().chain(self.attributes.iter()) {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            escape_into(value, output, true);
            output.push('"');
        }

        if self.children.is_empty() && self.text_content.is_empty() {
            output.push_str("/>");
        } else {
            output.push('>');

            if !self.text_content.is_empty() {
                escape_into(&self.text_content, output, false);
            }

            for child in &self.children {
                child.write_xml(output);
                if !child.tail.is_empty() {
                    escape_into(&child.tail, output, false);
                }
            }

            output.push_str("</");
            output.push_str(&self.tag_name);
            output.push('>');
        }
    }
}

/// Append parsed text at the current document position: before the
/// first child it is the open element's text, after a child it is that
/// child's tail.
fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        match current.children.last_mut() {
            Some(child) => child.tail.push_str(text),
            None => current.text_content.push_str(text),
        }
    }
}

/// Escape XML special characters into `output`. Quotes are only escaped
/// in attribute values.
fn escape_into(text: &str, output: &mut String, attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if attribute => output.push_str("&quot;"),
            _ => output.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let xml = br#"<root a="1"><child>hello</child><leaf/></root>"#;
        let root = Element::from_bytes(xml).unwrap();
        assert_eq!(root.tag_name(), "root");
        assert_eq!(root.get_attribute("a"), Some("1"));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].text(), "hello");
        assert_eq!(root.children()[1].tag_name(), "leaf");
    }

    #[test]
    fn test_namespace_inheritance() {
        let xml = br#"<m xmlns="http://www.w3.org/1998/Math/MathML"><semantics><mi>x</mi></semantics></m>"#;
        let root = Element::from_bytes(xml).unwrap();
        let semantics = &root.children()[0];
        assert_eq!(
            semantics.namespace_uri(),
            Some("http://www.w3.org/1998/Math/MathML")
        );
        assert!(semantics.name_matches("math:semantics"));
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let xml = r#"<r b="2" a="1"><x/><y>t</y></r>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.to_xml_string(), r#"<r b="2" a="1"><x/><y>t</y></r>"#);
    }

    #[test]
    fn test_declarations_reemitted() {
        let xml = r#"<r xmlns:t="urn:x"><t:c/></r>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.to_xml_string(), r#"<r xmlns:t="urn:x"><t:c/></r>"#);
    }

    #[test]
    fn test_text_escaping_roundtrip() {
        let xml = r#"<a>1 &lt; 2 &amp; 3</a>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.text(), "1 < 2 & 3");
        assert_eq!(root.to_xml_string(), r#"<a>1 &lt; 2 &amp; 3</a>"#);
    }

    #[test]
    fn test_mixed_content_roundtrip() {
        // Text interleaved with children keeps its position.
        let xml = r#"<text:p>What is <draw:frame a="1"/> equal to?</text:p>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.text(), "What is ");
        assert_eq!(root.children()[0].tail(), " equal to?");
        assert_eq!(root.to_xml_string(), xml);
    }

    #[test]
    fn test_entity_in_mixed_content_roundtrip() {
        let xml = r#"<p>a &amp; b<c/> x &lt; y</p>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.text(), "a & b");
        assert_eq!(root.children()[0].tail(), " x < y");
        assert_eq!(root.to_xml_string(), xml);
    }

    #[test]
    fn test_numeric_character_reference() {
        let xml = r#"<a>x&#38;y</a>"#;
        let root = Element::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(root.text(), "x&y");
    }

    #[test]
    fn test_attribute_mutation() {
        let mut el = Element::new("draw:frame");
        el.set_attribute("svg:y", "0pt");
        el.set_attribute("svg:y", "-9.1pt");
        assert_eq!(el.get_attribute("svg:y"), Some("-9.1pt"));
        assert_eq!(el.remove_attribute("svg:y"), Some("-9.1pt".to_string()));
        assert_eq!(el.get_attribute("svg:y"), None);
    }

    #[test]
    fn test_for_each_named() {
        let xml = br#"<root><text:p/><d><text:p/></d></root>"#;
        let root = Element::from_bytes(xml).unwrap();
        let mut count = 0;
        root.for_each_named("text:p", &mut |_| count += 1);
        assert_eq!(count, 2);
    }
}
