use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::darwin::{
    DEFAULT_COLUMNS, DEFAULT_GROUP_BY, DEFAULT_NAME_KEY, LATITUDE_KEY, LONGITUDE_KEY,
};
use crate::errors::ConvertError;
use crate::types::{ColumnTitle, FieldName};

/// Byte-to-text decoding applied to every input cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    /// Every byte maps to the code point of the same value.
    #[default]
    Latin1,
    /// UTF-8, with invalid sequences replaced.
    Utf8,
}

/// One description row: a display title and the field key (or space-joined keys) it shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Title printed in bold before the value.
    pub title: ColumnTitle,
    /// Field name, or several field names separated by spaces.
    pub key: FieldName,
}

/// Ordered description layout used for placemark cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLayout {
    columns: Vec<ColumnSpec>,
}

impl ColumnLayout {
    /// Build a layout from `(title, key)` pairs, preserving order.
    pub fn new<T, K, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (T, K)>,
        T: Into<String>,
        K: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(title, key)| ColumnSpec {
                    title: title.into(),
                    key: key.into(),
                })
                .collect(),
        }
    }

    /// Load a layout from a JSON array of `{"title": ..., "key": ...}` objects.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let layout: ColumnLayout = serde_json::from_str(&raw)?;
        if layout.columns.is_empty() {
            return Err(ConvertError::Configuration(format!(
                "column layout '{}' defines no columns",
                path.as_ref().display()
            )));
        }
        Ok(layout)
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

/// Top-level conversion configuration.
#[derive(Clone, Debug)]
pub struct ConvertConfig {
    /// Cell delimiter byte.
    pub delimiter: u8,
    /// Honor double-quoted cells. Off by default: cells are split on the delimiter only.
    pub quoting: bool,
    /// Decoding applied to raw cell bytes.
    pub encoding: InputEncoding,
    /// Ordered grouping keys; empty means every record stays ungrouped.
    ///
    /// An entry may join several field names with spaces (`"genus specificEpithet"`).
    pub group_by: Vec<FieldName>,
    /// Description layout.
    pub layout: ColumnLayout,
    /// Key (or space-joined keys) used for placemark names.
    pub name_key: FieldName,
    /// Column holding the longitude.
    pub longitude_key: FieldName,
    /// Column holding the latitude.
    pub latitude_key: FieldName,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quoting: false,
            encoding: InputEncoding::default(),
            group_by: DEFAULT_GROUP_BY.iter().map(|key| key.to_string()).collect(),
            layout: ColumnLayout::default(),
            name_key: DEFAULT_NAME_KEY.to_string(),
            longitude_key: LONGITUDE_KEY.to_string(),
            latitude_key: LATITUDE_KEY.to_string(),
        }
    }
}

impl ConvertConfig {
    /// Reject configurations that cannot produce a well-formed document.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if let Some(key) = self.group_by.iter().find(|key| key.trim().is_empty()) {
            return Err(ConvertError::Configuration(format!(
                "grouping key '{key}' must name at least one field"
            )));
        }
        if matches!(self.delimiter, b'\n' | b'\r') {
            return Err(ConvertError::Configuration(
                "delimiter cannot be a line terminator".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_layout_matches_darwin_core_columns() {
        let layout = ColumnLayout::default();
        assert_eq!(layout.columns().len(), 20);
        assert_eq!(layout.columns()[0].title, "Species");
        assert_eq!(layout.columns()[0].key, "genus specificEpithet subspecies");
        assert_eq!(layout.columns()[19].key, "collectionCode");
    }

    #[test]
    fn layout_loads_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Taxon", "key": "genus specificEpithet"}}, {{"title": "Where", "key": "locality"}}]"#
        )
        .unwrap();
        let layout = ColumnLayout::from_json_path(file.path()).unwrap();
        assert_eq!(
            layout,
            ColumnLayout::new([("Taxon", "genus specificEpithet"), ("Where", "locality")])
        );
    }

    #[test]
    fn empty_layout_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let err = ColumnLayout::from_json_path(file.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }

    #[test]
    fn validate_rejects_blank_group_keys() {
        let config = ConvertConfig {
            group_by: vec!["genus".to_string(), "  ".to_string()],
            ..ConvertConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConvertError::Configuration(_))
        ));
        assert!(ConvertConfig::default().validate().is_ok());
    }
}
