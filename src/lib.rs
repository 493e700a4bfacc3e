#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Canonical ordering of groups and records.
pub mod canonical;
/// Command-line entry point.
pub mod cli;
/// Leaf-group color synthesis.
pub mod color;
/// Conversion configuration and description layouts.
pub mod config;
/// Centralized constants (palette, KML namespaces, Darwin Core keys).
pub mod constants;
/// End-to-end conversion pipeline.
pub mod convert;
/// Placemark name, description, and coordinate formatting.
pub mod format;
/// KML serialization.
pub mod kml;
/// Delimited-text input.
pub mod reader;
/// Record model and field lookup.
pub mod record;
/// Grouping tree construction.
pub mod tree;
/// Shared type aliases.
pub mod types;

mod errors;

pub use canonical::{CanonicalContents, CanonicalGroup, CanonicalTree};
pub use color::{ColorAssignment, KmlColor, LeafStyle, assign_colors};
pub use config::{ColumnLayout, ColumnSpec, ConvertConfig, InputEncoding};
pub use convert::{ConversionSummary, convert, convert_file, convert_rows};
pub use errors::ConvertError;
pub use format::FieldFormatter;
pub use kml::{render_kml, write_kml};
pub use reader::{read_records, read_records_from_path};
pub use record::{FieldLookup, FieldMap, Record};
pub use tree::{BuildReport, GroupContents, GroupNode, GroupTree, Placement, SkippedRecord};
pub use types::{ColumnTitle, FieldName, FieldValue, GroupName, RowIndex, StyleId};
