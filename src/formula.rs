//! Recoloring of a single embedded formula document.
//!
//! The object's content document exposes one `semantics` element whose
//! children are the renderable formula tree plus one `annotation`
//! holding a textual serialization of the same formula. Recoloring
//! wraps the formula tree in an `mstyle` element carrying the color and
//! prefixes the annotation text with a machine-readable directive.

use crate::color::FormulaColor;
use crate::error::{Error, Result};
use crate::xml::Element;

/// Apply `color` to the formula document rooted at `root`.
///
/// After this call the `semantics` children are
/// `[mstyle(mathcolor)[...original formula tree, order preserved...],
/// annotation]` and the annotation text reads
/// `color <name> {<original>}`.
///
/// # Errors
///
/// `MalformedFormula` when no `semantics` element exists or it has no
/// children. A missing `annotation` is a logged warning, not an error.
pub fn recolor_formula(root: &mut Element, color: FormulaColor) -> Result<()> {
    let semantics = root
        .find_child_mut("math:semantics")
        .ok_or_else(|| Error::MalformedFormula("no semantics element".to_string()))?;

    if semantics.children().is_empty() {
        return Err(Error::MalformedFormula(
            "semantics element has no children".to_string(),
        ));
    }

    // Move every non-annotation child into the color wrapper, keeping
    // their relative order.
    let mut wrapper = Element::new_with_context("mstyle", semantics.namespace_context().clone());
    wrapper.set_attribute("mathcolor", color.name());

    let mut annotations = Vec::new();
    for child in std::mem::take(semantics.children_mut()) {
        if child.name_matches("math:annotation") {
            annotations.push(child);
        } else {
            wrapper.add_child(child);
        }
    }

    semantics.add_child(wrapper);
    for annotation in annotations {
        semantics.add_child(annotation);
    }

    match semantics.find_child_mut("math:annotation") {
        Some(annotation) => {
            let directive = format!("color {} {{{}}}", color.name(), annotation.text());
            annotation.set_text(&directive);
        },
        None => {
            log::warn!("formula has no annotation element; color directive not recorded");
        },
    }

    Ok(())
}
