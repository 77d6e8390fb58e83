//! Pipeline orchestration.
//!
//! One run stages the artifact, resolves the target-color style set,
//! locates and recolors embedded formula objects, normalizes formula
//! frame geometry, and atomically replaces the artifact with the
//! repackaged result. Per-object failures are logged and skipped;
//! geometry failures are logged and the run continues to repackaging.
//! The staging directory is removed on every exit path.

use crate::color::FormulaColor;
use crate::error::{Error, Result};
use crate::formula::recolor_formula;
use crate::geometry::{self, normalize_frames};
use crate::locate::locate_styled_objects;
use crate::package::{Staging, repackage};
use crate::style::StyleGraph;
use crate::xml::Element;
use std::path::Path;

const STYLES_PART: &str = "styles.xml";
const CONTENT_PART: &str = "content.xml";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Target color: formulas in text of this color are recolored to it.
    pub color: FormulaColor,
    /// Base vertical offset below the text baseline, in points.
    pub formula_base_pt: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color: FormulaColor::Red,
            formula_base_pt: geometry::DEFAULT_FORMULA_BASE_PT,
        }
    }
}

/// Outcome counters for a completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Style names matching the target color after both cascades.
    pub styles_matched: usize,
    /// Embedded objects successfully recolored.
    pub objects_recolored: usize,
    /// Embedded objects skipped because of per-object errors.
    pub objects_skipped: usize,
    /// Image assets deleted after their references were pruned.
    pub images_removed: usize,
    /// Frames whose vertical offset was recomputed.
    pub frames_normalized: usize,
}

/// The formula recoloring pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline over `artifact`, replacing it in place.
    ///
    /// The original file is only replaced after the new archive is
    /// fully written; on any error the original is left byte-identical
    /// to its pre-run state.
    pub fn run(&self, artifact: &Path) -> Result<RunSummary> {
        let staging = Staging::extract(artifact)?;
        // Staging cleanup is RAII: the directory is removed when
        // `staging` drops, on success and on every error path alike.
        let summary = self.run_staged(&staging)?;
        repackage(staging.root(), artifact)?;
        Ok(summary)
    }

    fn run_staged(&self, staging: &Staging) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        // Style-document cascade: names whose resolved color matches.
        let styles_xml = staging.read_part(STYLES_PART)?;
        let style_graph = StyleGraph::from_xml(&styles_xml)?;
        let mut matching = style_graph.resolve(self.config.color.rgb());
        log::debug!(
            "{} of {} styles resolve to {}",
            matching.len(),
            style_graph.len(),
            self.config.color
        );

        // Body document: extend through the local cascade, collect
        // object paths, strip image references.
        let content_xml = staging.read_part(CONTENT_PART)?;
        let mut content = Element::from_bytes(&content_xml)?;
        let body_graph = StyleGraph::from_xml(&content_xml)?;
        let located = locate_styled_objects(&mut content, &body_graph, &mut matching);
        summary.styles_matched = matching.len();
        staging.write_part(CONTENT_PART, content.to_document_string().as_bytes())?;

        for image in &located.images {
            if staging.remove_part(image)? {
                summary.images_removed += 1;
            } else {
                log::warn!("pruned image reference has no asset in package: {}", image);
            }
        }

        for object in &located.objects {
            match self.recolor_object(staging, object) {
                Ok(()) => summary.objects_recolored += 1,
                Err(err) => {
                    log::warn!("skipping formula object {}: {}", object, err);
                    summary.objects_skipped += 1;
                },
            }
        }

        // Frame geometry runs on the persisted body document so the
        // pruned image references stay gone.
        let content_xml = staging.read_part(CONTENT_PART)?;
        let mut content = Element::from_bytes(&content_xml)?;
        match normalize_frames(&mut content, self.config.formula_base_pt) {
            Ok(count) => {
                staging.write_part(CONTENT_PART, content.to_document_string().as_bytes())?;
                summary.frames_normalized = count;
            },
            Err(err) => {
                // Structural geometry errors abort only this sub-stage.
                log::warn!("frame geometry normalization skipped: {}", err);
            },
        }

        Ok(summary)
    }

    fn recolor_object(&self, staging: &Staging, object: &str) -> Result<()> {
        let part = format!("{}/content.xml", object);
        let bytes = staging.read_part(&part)?;
        let mut root = Element::from_bytes(&bytes)?;
        recolor_formula(&mut root, self.config.color)?;
        staging.write_part(&part, root.to_document_string().as_bytes())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
