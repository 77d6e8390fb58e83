//! Style cascade resolution.
//!
//! Style definitions form a name-indexed forest: each `style:style`
//! element names an optional parent and may carry an explicit text color
//! in its `style:text-properties`. Resolution walks parent links with a
//! per-walk visited set, so dangling parents and cycles resolve to "no
//! color" instead of failing. One [`StyleGraph`] type serves both
//! `styles.xml` and the body document's local style definitions.

use crate::color::RgbColor;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A single named style with optional explicit color and parent link.
#[derive(Debug, Clone)]
pub struct StyleNode {
    pub name: String,
    pub color: Option<RgbColor>,
    pub parent: Option<String>,
}

/// Name-indexed forest of style definitions.
#[derive(Debug, Clone, Default)]
pub struct StyleGraph {
    nodes: HashMap<String, StyleNode>,
    /// Document order of style names, for deterministic iteration.
    order: Vec<String>,
}

impl StyleGraph {
    /// Parse every `style:style` element from a style or content
    /// document.
    pub fn from_xml(bytes: &[u8]) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut graph = Self::default();
        let mut current: Option<StyleNode> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let tag = name.as_ref();

                    if tag == b"style:style" {
                        current = Some(Self::node_from_tag(e)?);
                    } else if tag == b"style:text-properties"
                        && let Some(ref mut node) = current
                        && let Some(color) = attribute(e, b"fo:color")?
                    {
                        node.color = RgbColor::from_hex(&color);
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    let tag = name.as_ref();

                    if tag == b"style:style" {
                        // Self-closing style: no nested properties.
                        graph.insert(Self::node_from_tag(e)?);
                    } else if tag == b"style:text-properties"
                        && let Some(ref mut node) = current
                        && let Some(color) = attribute(e, b"fo:color")?
                    {
                        node.color = RgbColor::from_hex(&color);
                    }
                },
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"style:style"
                        && let Some(node) = current.take()
                    {
                        graph.insert(node);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::InvalidFormat(format!("XML parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(graph)
    }

    fn node_from_tag(e: &BytesStart) -> Result<StyleNode> {
        Ok(StyleNode {
            name: attribute(e, b"style:name")?.unwrap_or_default(),
            color: None,
            parent: attribute(e, b"style:parent-style-name")?,
        })
    }

    fn insert(&mut self, node: StyleNode) {
        if node.name.is_empty() {
            return;
        }
        if !self.nodes.contains_key(&node.name) {
            self.order.push(node.name.clone());
        }
        self.nodes.insert(node.name.clone(), node);
    }

    /// Get a style node by name.
    pub fn get(&self, name: &str) -> Option<&StyleNode> {
        self.nodes.get(name)
    }

    /// Number of styles in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no styles.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compute the set of style names whose cascade-resolved color
    /// equals `target`.
    ///
    /// Resolution is a single fixed-point pass: per-node resolved colors
    /// are memoized within this call only, and iteration order cannot
    /// change the result.
    pub fn resolve(&self, target: RgbColor) -> BTreeSet<String> {
        let mut memo: HashMap<&str, Option<RgbColor>> = HashMap::new();
        let mut matching = BTreeSet::new();

        for name in &self.order {
            let mut visited = HashSet::new();
            if self.resolved_color(name, &mut memo, &mut visited) == Some(target) {
                matching.insert(name.clone());
            }
        }
        matching
    }

    fn resolved_color<'a>(
        &'a self,
        name: &'a str,
        memo: &mut HashMap<&'a str, Option<RgbColor>>,
        visited: &mut HashSet<&'a str>,
    ) -> Option<RgbColor> {
        if let Some(color) = memo.get(name) {
            return *color;
        }
        if !visited.insert(name) {
            // Cyclic parent chain: every node on the cycle resolves to
            // no color.
            return None;
        }
        let Some(node) = self.nodes.get(name) else {
            // Dangling parent reference.
            return None;
        };

        let color = match node.color {
            Some(explicit) => Some(explicit),
            None => node
                .parent
                .as_deref()
                .and_then(|parent| self.resolved_color(parent, memo, visited)),
        };
        memo.insert(&node.name, color);
        color
    }

    /// Extend `matching` with every style whose declared parent is
    /// already a member, repeating until no new name qualifies.
    ///
    /// This is the body-local cascade extension: the body document may
    /// define styles whose parents live in the style document, and a
    /// paragraph may reference a style that only qualifies through this
    /// chain.
    pub fn extend_membership(&self, matching: &mut BTreeSet<String>) {
        loop {
            let mut added = false;
            for name in &self.order {
                if matching.contains(name) {
                    continue;
                }
                let node = &self.nodes[name];
                if let Some(parent) = node.parent.as_deref()
                    && matching.contains(parent)
                {
                    matching.insert(name.clone());
                    added = true;
                }
            }
            if !added {
                break;
            }
        }
    }
}

/// Extract an attribute value from a start tag by its qualified name.
fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| Error::InvalidFormat(format!("Invalid attribute: {}", e)))?;
        if attr.key.as_ref() == name {
            let raw = String::from_utf8(attr.value.to_vec()).map_err(|_| {
                Error::InvalidFormat("Invalid UTF-8 in attribute value".to_string())
            })?;
            let value = quick_xml::escape::unescape(&raw)
                .map_err(|e| Error::InvalidFormat(format!("Invalid character reference: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
