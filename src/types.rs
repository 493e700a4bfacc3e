/// Column name from the input header.
/// Examples: `genus`, `specificEpithet`, `decimalLatitude`
pub type FieldName = String;
/// Raw cell value for a column.
/// Examples: `Canis`, `lupus`, `-105.2705`
pub type FieldValue = String;
/// Name of a group folder at one depth of the grouping tree (a resolved field value).
/// Examples: `Canis`, `lupus`
pub type GroupName = String;
/// Space-joined ancestor path identifying a leaf group's style.
/// Example: `Canis lupus`
pub type StyleId = String;
/// Human-readable column title shown in placemark descriptions.
/// Examples: `Species`, `Catalog Number`
pub type ColumnTitle = String;
/// Zero-based data row index (header excluded) used in diagnostics.
pub type RowIndex = usize;
