//! Formula frame placement normalization.
//!
//! Formula raster height varies per formula, but the frame anchor must
//! stay visually aligned with the surrounding text. Every frame whose
//! style inherits directly from the `Formula` family gets its vertical
//! offset recomputed from its rendered height:
//! `svg:y = -(height / 2 + base_pt)`. The qualifying styles themselves
//! are rewritten to the fixed placement mode (`vertical-pos="from-top"`,
//! conflicting `vertical-rel` removed) whether or not a frame uses them.

use crate::error::{Error, Result};
use crate::xml::Element;
use std::collections::BTreeSet;

/// Structural style family formula frames inherit from.
pub const FORMULA_PARENT_FAMILY: &str = "Formula";

/// Default base offset below the text baseline, in points.
pub const DEFAULT_FORMULA_BASE_PT: f64 = 4.1;

/// Normalize every formula frame in the body document.
///
/// Returns the number of frames modified.
///
/// # Errors
///
/// `NoMatchingStyle` when no style in the document declares the
/// `Formula` parent family (the document is not of the expected shape),
/// `NoMatchingFrame` when styles qualify but no frame uses any of them.
pub fn normalize_frames(content: &mut Element, base_pt: f64) -> Result<usize> {
    let mut formula_styles: BTreeSet<String> = BTreeSet::new();

    content.for_each_named_mut("style:style", &mut |style| {
        if style.get_attribute("style:parent-style-name") != Some(FORMULA_PARENT_FAMILY) {
            return;
        }
        if let Some(name) = style.get_attribute("style:name") {
            formula_styles.insert(name.to_string());
        }
        if let Some(props) = style.find_child_mut("style:graphic-properties") {
            props.set_attribute("style:vertical-pos", "from-top");
            props.remove_attribute("style:vertical-rel");
        }
    });

    if formula_styles.is_empty() {
        return Err(Error::NoMatchingStyle(FORMULA_PARENT_FAMILY.to_string()));
    }

    let mut modified = 0usize;
    content.for_each_named_mut("draw:frame", &mut |frame| {
        let Some(style_name) = frame.get_attribute("draw:style-name").map(str::to_string) else {
            return;
        };
        if !formula_styles.contains(&style_name) {
            return;
        }
        // Frames without a height cannot be repositioned; skip them.
        let Some(height) = frame.get_attribute("svg:height").and_then(parse_pt) else {
            return;
        };
        let y = -(height / 2.0 + base_pt);
        frame.set_attribute("svg:y", &format!("{}pt", y));
        modified += 1;
    });

    if modified == 0 {
        return Err(Error::NoMatchingFrame);
    }
    Ok(modified)
}

/// Parse a point length such as `10pt`.
fn parse_pt(value: &str) -> Option<f64> {
    value.trim().strip_suffix("pt")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_xml(styles: &str, body: &str) -> Vec<u8> {
        format!(
            r#"<office:document-content
 xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
 xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
 xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
 xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0"
 xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0">
<office:automatic-styles>{}</office:automatic-styles>
<office:body><office:text>{}</office:text></office:body>
</office:document-content>"#,
            styles, body
        )
        .into_bytes()
    }

    #[test]
    fn test_offset_from_height() {
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:family="graphic" style:parent-style-name="Formula">
                 <style:graphic-properties style:vertical-pos="middle" style:vertical-rel="text"/>
               </style:style>"#,
            r#"<text:p><draw:frame draw:style-name="fr1" svg:height="10pt" svg:y="0pt"/></text:p>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        let modified = normalize_frames(&mut content, DEFAULT_FORMULA_BASE_PT).unwrap();
        assert_eq!(modified, 1);

        let serialized = content.to_xml_string();
        assert!(serialized.contains(r#"svg:y="-9.1pt""#));
        assert!(serialized.contains(r#"style:vertical-pos="from-top""#));
        assert!(!serialized.contains("style:vertical-rel"));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:parent-style-name="Formula"/>"#,
            r#"<draw:frame draw:style-name="fr1" svg:height="7pt"/>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        normalize_frames(&mut content, 4.1).unwrap();
        let first = content.to_xml_string();
        normalize_frames(&mut content, 4.1).unwrap();
        assert_eq!(content.to_xml_string(), first);
    }

    #[test]
    fn test_no_matching_style_is_hard_error() {
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:parent-style-name="Graphics"/>"#,
            r#"<draw:frame draw:style-name="fr1" svg:height="10pt"/>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        assert!(matches!(
            normalize_frames(&mut content, 4.1),
            Err(Error::NoMatchingStyle(_))
        ));
    }

    #[test]
    fn test_no_matching_frame_is_hard_error() {
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:parent-style-name="Formula"/>"#,
            r#"<draw:frame draw:style-name="other" svg:height="10pt"/>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        assert!(matches!(
            normalize_frames(&mut content, 4.1),
            Err(Error::NoMatchingFrame)
        ));
    }

    #[test]
    fn test_frame_without_height_is_skipped() {
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:parent-style-name="Formula"/>"#,
            r#"<text:p><draw:frame draw:style-name="fr1"/><draw:frame draw:style-name="fr1" svg:height="6pt"/></text:p>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        assert_eq!(normalize_frames(&mut content, 4.1).unwrap(), 1);
        assert!(content.to_xml_string().contains(r#"svg:y="-7.1pt""#));
    }

    #[test]
    fn test_style_rewrite_applies_without_frames_using_it() {
        // Two qualifying styles, only one used by a frame: both get the
        // placement rewrite.
        let xml = content_xml(
            r#"<style:style style:name="fr1" style:parent-style-name="Formula">
                 <style:graphic-properties style:vertical-rel="text"/>
               </style:style>
               <style:style style:name="fr2" style:parent-style-name="Formula">
                 <style:graphic-properties style:vertical-rel="text"/>
               </style:style>"#,
            r#"<draw:frame draw:style-name="fr1" svg:height="10pt"/>"#,
        );
        let mut content = Element::from_bytes(&xml).unwrap();
        normalize_frames(&mut content, 4.1).unwrap();
        assert!(!content.to_xml_string().contains("style:vertical-rel"));
    }
}
