//! Rendered artifacts: chart images and the workbook that embeds them.
//!
//! Chart drawing knows nothing about the workbook layout; the exporter only
//! receives image paths, so another output format can replace it.

pub mod charts;
pub mod fonts;
pub mod workbook;

pub use charts::{ChartArtifact, ChartData, ChartKind, ChartRenderError, ChartRenderer};
pub use workbook::{export_workbook, ExportError};
