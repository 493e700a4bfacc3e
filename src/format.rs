//! Placemark text built from record fields.

use tracing::warn;

use crate::config::{ColumnLayout, ConvertConfig};
use crate::constants::kml::POINT_ALTITUDE;
use crate::record::{FieldLookup, Record};
use crate::types::FieldName;

/// Renders placemark names, description cards, and coordinates.
#[derive(Clone, Debug)]
pub struct FieldFormatter {
    layout: ColumnLayout,
    name_key: FieldName,
    longitude_key: FieldName,
    latitude_key: FieldName,
}

impl FieldFormatter {
    /// Formatter using the layout and keys of `config`.
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            name_key: config.name_key.clone(),
            longitude_key: config.longitude_key.clone(),
            latitude_key: config.latitude_key.clone(),
        }
    }

    /// Resolve `key` (or space-joined keys), falling back to the raw key text.
    pub fn resolve(&self, record: &Record, key: &str) -> Result<String, String> {
        match record.lookup(key) {
            FieldLookup::Found(value) => Ok(value.into_owned()),
            FieldLookup::Missing(missing) => {
                warn!(
                    row = record.row(),
                    key = missing,
                    "[darwin_kml:format] could not find key in record data"
                );
                Err(key.to_string())
            }
        }
    }

    /// Placemark title; the raw name key when a part is missing.
    pub fn placemark_name(&self, record: &Record) -> String {
        match self.resolve(record, &self.name_key) {
            Ok(name) => name.trim().to_string(),
            Err(raw) => raw,
        }
    }

    /// HTML description lines, one `<b>Title:</b> value<br>` per layout column.
    ///
    /// A column whose key cannot be resolved contributes its raw key text.
    pub fn describe(&self, record: &Record) -> String {
        let mut out = String::new();
        for column in self.layout.columns() {
            match self.resolve(record, &column.key) {
                Ok(value) => {
                    out.push_str(&format!("<b>{}:</b> {}<br>\n", column.title, value));
                }
                Err(raw) => out.push_str(&raw),
            }
        }
        out
    }

    /// `longitude,latitude,0`, or `None` when either coordinate column is missing.
    pub fn coordinates(&self, record: &Record) -> Option<String> {
        let longitude = record.get(&self.longitude_key)?.trim();
        let latitude = record.get(&self.latitude_key)?.trim();
        Some(format!("{longitude},{latitude},{POINT_ALTITUDE}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldMap;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let fields: FieldMap = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Record::ungrouped(0, fields)
    }

    fn formatter(columns: &[(&str, &str)]) -> FieldFormatter {
        FieldFormatter::from_config(&ConvertConfig {
            layout: ColumnLayout::new(columns.iter().copied()),
            ..ConvertConfig::default()
        })
    }

    #[test]
    fn describe_renders_layout_in_order() {
        let formatter = formatter(&[("Species", "genus specificEpithet"), ("Sex", "sex")]);
        let record = record(&[("sex", "female"), ("genus", "Canis"), ("specificEpithet", "lupus")]);
        assert_eq!(
            formatter.describe(&record),
            "<b>Species:</b> Canis lupus<br>\n<b>Sex:</b> female<br>\n"
        );
    }

    #[test]
    fn missing_column_falls_back_to_raw_key() {
        let formatter = formatter(&[("Sex", "sex"), ("Habitat", "habitat")]);
        let record = record(&[("sex", "male")]);
        assert_eq!(formatter.describe(&record), "<b>Sex:</b> male<br>\nhabitat");
    }

    #[test]
    fn placemark_name_trims_empty_subspecies() {
        let formatter = formatter(&[]);
        let record = record(&[("genus", "Canis"), ("specificEpithet", "lupus"), ("subspecies", "")]);
        assert_eq!(formatter.placemark_name(&record), "Canis lupus");

        let partial = self::record(&[("genus", "Canis")]);
        assert_eq!(
            formatter.placemark_name(&partial),
            "genus specificEpithet subspecies"
        );
    }

    #[test]
    fn coordinates_are_longitude_first() {
        let formatter = formatter(&[]);
        let record = record(&[("decimalLatitude", "40.01"), ("decimalLongitude", "-105.27 ")]);
        assert_eq!(
            formatter.coordinates(&record).as_deref(),
            Some("-105.27,40.01,0")
        );
        let missing = self::record(&[("decimalLatitude", "40.01")]);
        assert_eq!(formatter.coordinates(&missing), None);
    }
}
