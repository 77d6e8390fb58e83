//! Styled-object location in the body document.
//!
//! Finds every paragraph whose style resolves to the target color,
//! records the embedded formula objects referenced by its frames, and
//! strips paired preview images from those frames in place. The body
//! document carries its own local style definitions whose parents may
//! live in `styles.xml`; the matching set is extended through that
//! local cascade to a fixed point before paragraphs are scanned.

use crate::style::StyleGraph;
use crate::xml::Element;
use std::collections::BTreeSet;

/// Paths collected from the body document, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocatedObjects {
    /// Relative paths of embedded formula objects to recolor.
    pub objects: Vec<String>,
    /// Relative paths of image assets whose references were removed.
    pub images: Vec<String>,
}

/// Scan the body document for frames in paragraphs styled with a
/// matching style.
///
/// `matching` is extended through `body_graph`'s parent links first.
/// Image references inside matching frames are removed from `content`
/// in place; the caller persists the mutated document and deletes the
/// image assets.
pub fn locate_styled_objects(
    content: &mut Element,
    body_graph: &StyleGraph,
    matching: &mut BTreeSet<String>,
) -> LocatedObjects {
    body_graph.extend_membership(matching);

    let mut located = LocatedObjects::default();

    content.for_each_named_mut("text:p", &mut |paragraph| {
        let styled = paragraph
            .get_attribute("text:style-name")
            .is_some_and(|name| matching.contains(name));
        if !styled {
            return;
        }

        paragraph.for_each_named_mut("draw:frame", &mut |frame| {
            scan_frame(frame, &mut located);
        });
    });

    located
}

/// Collect object hrefs and prune image references at every depth
/// under a frame; objects may sit below intermediate wrappers.
fn scan_frame(element: &mut Element, located: &mut LocatedObjects) {
    element.children_mut().retain(|child| {
        if child.name_matches("draw:image") {
            if let Some(href) = child.get_attribute("xlink:href") {
                log::debug!("pruning image reference {}", href);
                located.images.push(normalize_href(href));
            }
            // The formula object supersedes the image; drop the
            // reference even when it carries no href.
            false
        } else {
            true
        }
    });

    for child in element.children_mut() {
        if child.name_matches("draw:object")
            && let Some(href) = child.get_attribute("xlink:href")
        {
            located.objects.push(normalize_href(href));
        }
        scan_frame(child, located);
    }
}

/// Hrefs in ODF documents are typically written relative to the package
/// root with a leading `./`.
fn normalize_href(href: &str) -> String {
    href.trim_start_matches("./").to_string()
}
