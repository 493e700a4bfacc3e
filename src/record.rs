use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::constants::PATH_SEPARATOR;
use crate::errors::ConvertError;
use crate::types::{FieldName, FieldValue, GroupName, RowIndex};

/// Flat column -> value mapping for one input row, in header order.
pub type FieldMap = IndexMap<FieldName, FieldValue>;

/// Outcome of resolving a key (or space-joined keys) against a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldLookup<'a> {
    /// Every named field was present; multi-key values are joined with a space.
    Found(Cow<'a, str>),
    /// The first field name that was absent.
    Missing(&'a str),
}

impl<'a> FieldLookup<'a> {
    /// Found value, if any.
    pub fn found(self) -> Option<Cow<'a, str>> {
        match self {
            FieldLookup::Found(value) => Some(value),
            FieldLookup::Missing(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
enum GroupValues {
    Resolved(Vec<GroupName>),
    Missing(FieldName),
}

/// Immutable view over one input row plus its resolved grouping values.
#[derive(Clone, Debug)]
pub struct Record {
    row: RowIndex,
    fields: FieldMap,
    group_path: Arc<[FieldName]>,
    group_values: GroupValues,
}

impl Record {
    /// Build a record and resolve every entry of `group_path` against `fields`.
    ///
    /// A missing grouping field does not fail construction; it surfaces from
    /// [`Record::group_values`] so the tree builder can skip the record.
    pub fn new(row: RowIndex, fields: FieldMap, group_path: Arc<[FieldName]>) -> Self {
        let group_values = resolve_path(&fields, &group_path);
        Self {
            row,
            fields,
            group_path,
            group_values,
        }
    }

    /// Record with no grouping path; it always lands in the ungrouped list.
    pub fn ungrouped(row: RowIndex, fields: FieldMap) -> Self {
        Self::new(row, fields, Arc::from(Vec::new()))
    }

    /// Zero-based data row index.
    pub fn row(&self) -> RowIndex {
        self.row
    }

    /// All fields in header order.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Exact-match lookup of a single field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Resolve `key`, joining the values of space-separated field names.
    pub fn lookup<'a>(&'a self, key: &'a str) -> FieldLookup<'a> {
        lookup_in(&self.fields, key)
    }

    /// Grouping keys this record was built with.
    pub fn group_path(&self) -> &[FieldName] {
        &self.group_path
    }

    /// Whether the record carries any grouping keys.
    pub fn is_grouped(&self) -> bool {
        !self.group_path.is_empty()
    }

    /// Resolved grouping values, one per grouping key.
    pub fn group_values(&self) -> Result<&[GroupName], ConvertError> {
        match &self.group_values {
            GroupValues::Resolved(values) => Ok(values),
            GroupValues::Missing(key) => Err(ConvertError::MissingGroupKey {
                key: key.clone(),
                row: self.row,
            }),
        }
    }

    /// Grouping tuple used for ordering; empty when a grouping field is missing.
    pub fn sort_key(&self) -> &[GroupName] {
        match &self.group_values {
            GroupValues::Resolved(values) => values,
            GroupValues::Missing(_) => &[],
        }
    }

    /// Grouping values joined with a space (`"Canis lupus"`).
    pub fn group_label(&self) -> Option<String> {
        self.group_values()
            .ok()
            .map(|values| values.join(PATH_SEPARATOR))
    }
}

fn resolve_path(fields: &FieldMap, group_path: &[FieldName]) -> GroupValues {
    let mut values = Vec::with_capacity(group_path.len());
    for key in group_path {
        match lookup_in(fields, key) {
            FieldLookup::Found(value) => values.push(value.into_owned()),
            FieldLookup::Missing(missing) => return GroupValues::Missing(missing.to_string()),
        }
    }
    GroupValues::Resolved(values)
}

fn lookup_in<'a>(fields: &'a FieldMap, key: &'a str) -> FieldLookup<'a> {
    if !key.contains(PATH_SEPARATOR) {
        return match fields.get(key) {
            Some(value) => FieldLookup::Found(Cow::Borrowed(value.as_str())),
            None => FieldLookup::Missing(key),
        };
    }
    let mut parts = Vec::new();
    for part in key.split(PATH_SEPARATOR).filter(|part| !part.is_empty()) {
        match fields.get(part) {
            Some(value) => parts.push(value.as_str()),
            None => return FieldLookup::Missing(part),
        }
    }
    FieldLookup::Found(Cow::Owned(parts.join(PATH_SEPARATOR)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn path(keys: &[&str]) -> Arc<[FieldName]> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn resolves_group_values_in_path_order() {
        let record = Record::new(
            0,
            fields(&[("specificEpithet", "lupus"), ("genus", "Canis")]),
            path(&["genus", "specificEpithet"]),
        );
        assert_eq!(record.group_values().unwrap(), ["Canis", "lupus"]);
        assert_eq!(record.group_label().as_deref(), Some("Canis lupus"));
        assert!(record.is_grouped());
    }

    #[test]
    fn missing_group_field_is_reported_with_row_and_key() {
        let record = Record::new(
            7,
            fields(&[("genus", "Canis")]),
            path(&["genus", "specificEpithet"]),
        );
        match record.group_values() {
            Err(ConvertError::MissingGroupKey { key, row }) => {
                assert_eq!(key, "specificEpithet");
                assert_eq!(row, 7);
            }
            other => panic!("expected MissingGroupKey, got {other:?}"),
        }
        assert!(record.sort_key().is_empty());
        assert_eq!(record.group_label(), None);
    }

    #[test]
    fn multi_key_lookup_joins_values() {
        let record = Record::ungrouped(
            0,
            fields(&[("genus", "Canis"), ("specificEpithet", "lupus"), ("subspecies", "")]),
        );
        assert_eq!(
            record.lookup("genus specificEpithet subspecies"),
            FieldLookup::Found(Cow::Owned("Canis lupus ".to_string()))
        );
        assert_eq!(record.lookup("genus family"), FieldLookup::Missing("family"));
        assert_eq!(record.lookup("genus").found().as_deref(), Some("Canis"));
    }

    #[test]
    fn multi_key_group_entry_resolves_to_single_level() {
        let record = Record::new(
            0,
            fields(&[("genus", "Canis"), ("specificEpithet", "lupus")]),
            path(&["genus specificEpithet"]),
        );
        assert_eq!(record.group_values().unwrap(), ["Canis lupus"]);
    }

    #[test]
    fn ungrouped_record_has_empty_values() {
        let record = Record::ungrouped(3, fields(&[("genus", "Canis")]));
        assert!(!record.is_grouped());
        assert!(record.group_values().unwrap().is_empty());
        assert_eq!(record.get("genus"), Some("Canis"));
        assert_eq!(record.get("family"), None);
    }
}
