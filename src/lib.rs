//! Recolor embedded MathML formulas in OpenDocument text files.
//!
//! An ODT package is a ZIP archive of namespaced XML parts, some of
//! which are themselves nested containers holding embedded formula
//! objects. This crate finds every formula whose effective text color
//! (resolved through the style-inheritance cascade) matches a target
//! color, rewrites the formula markup to carry the color directly,
//! normalizes the formula frames' vertical placement, and atomically
//! repackages the document in place.
//!
//! # Example
//!
//! ```no_run
//! use odf_recolor::{FormulaColor, Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! # fn main() -> odf_recolor::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig {
//!     color: FormulaColor::Red,
//!     ..PipelineConfig::default()
//! });
//! let summary = pipeline.run(Path::new("quiz.odt"))?;
//! println!(
//!     "recolored {} formulas, skipped {}",
//!     summary.objects_recolored, summary.objects_skipped
//! );
//! # Ok(())
//! # }
//! ```

/// Color types and the enumerated target-color configuration surface
pub mod color;
/// Unified error types
pub mod error;
/// Recoloring of a single embedded formula document
pub mod formula;
/// Formula frame placement normalization
pub mod geometry;
/// Styled-object location in the body document
pub mod locate;
/// Container adapter: staging and transactional repackaging
pub mod package;
/// Pipeline orchestration
pub mod pipeline;
/// Style cascade resolution
pub mod style;
/// XML infrastructure: namespaces and the mutable element tree
pub mod xml;

// Re-export the main APIs
pub use color::{FormulaColor, RgbColor};
pub use error::{Error, Result};
pub use locate::LocatedObjects;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use style::{StyleGraph, StyleNode};
