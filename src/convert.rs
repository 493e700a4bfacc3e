//! End-to-end conversion: delimited rows in, KML document out.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::canonical::CanonicalTree;
use crate::color::assign_colors;
use crate::config::ConvertConfig;
use crate::errors::ConvertError;
use crate::format::FieldFormatter;
use crate::kml::write_kml;
use crate::reader::{read_records, read_records_from_path};
use crate::record::{FieldMap, Record};
use crate::tree::{GroupTree, SkippedRecord};
use crate::types::FieldName;

/// Counts describing one finished conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Data rows read from the input.
    pub rows_read: usize,
    /// Records placed in leaf groups.
    pub grouped: usize,
    /// Records written outside any folder.
    pub ungrouped: usize,
    /// Records excluded because a grouping field was missing.
    pub skipped: Vec<SkippedRecord>,
    /// Folders written, at every depth.
    pub folders: usize,
    /// Leaf folders, each with its own style.
    pub leaf_groups: usize,
}

/// Convert the delimited text in `input` and write KML to `output`.
pub fn convert<R: io::Read, W: io::Write>(
    input: R,
    output: W,
    config: &ConvertConfig,
) -> Result<ConversionSummary, ConvertError> {
    config.validate()?;
    let rows = read_records(input, "<input>", config)?;
    convert_rows(rows, output, config)
}

/// Convert the file at `input` into a KML file at `output`.
///
/// The document is rendered in memory first; `output` is only created or
/// replaced once every stage has succeeded.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<ConversionSummary, ConvertError> {
    config.validate()?;
    let rows = read_records_from_path(input.as_ref(), config)?;
    let mut document = Vec::new();
    let summary = convert_rows(rows, &mut document, config)?;
    fs::write(output.as_ref(), &document)?;
    info!(
        input = %input.as_ref().display(),
        output = %output.as_ref().display(),
        "[darwin_kml] wrote document"
    );
    Ok(summary)
}

/// Group, order, color, and render already-parsed rows.
pub fn convert_rows<W: io::Write>(
    rows: Vec<FieldMap>,
    output: W,
    config: &ConvertConfig,
) -> Result<ConversionSummary, ConvertError> {
    let rows_read = rows.len();
    let group_path: Arc<[FieldName]> = Arc::from(config.group_by.clone());
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(row, fields)| Record::new(row, fields, Arc::clone(&group_path)));

    let (tree, report) = GroupTree::build(records)?;
    let canonical = CanonicalTree::new(&tree);
    let colors = assign_colors(&canonical);
    let formatter = FieldFormatter::from_config(config);
    write_kml(output, &canonical, &colors, &formatter)?;

    let (folders, leaf_groups) = tree.node_counts();
    let summary = ConversionSummary {
        rows_read,
        grouped: report.grouped,
        ungrouped: report.ungrouped,
        skipped: report.skipped,
        folders,
        leaf_groups,
    };
    info!(
        rows = summary.rows_read,
        grouped = summary.grouped,
        ungrouped = summary.ungrouped,
        skipped = summary.skipped.len(),
        folders = summary.folders,
        leaf_groups = summary.leaf_groups,
        "[darwin_kml] conversion complete"
    );
    Ok(summary)
}
