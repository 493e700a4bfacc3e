//! Delimited-text input: header row plus one flat field map per data row.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, warn};

use crate::config::{ConvertConfig, InputEncoding};
use crate::errors::ConvertError;
use crate::record::FieldMap;
use crate::types::FieldName;

/// Read every data row of `input` into a field map keyed by the header row.
///
/// `input_name` only labels diagnostics.
pub fn read_records<R: io::Read>(
    input: R,
    input_name: &str,
    config: &ConvertConfig,
) -> Result<Vec<FieldMap>, ConvertError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .quoting(config.quoting)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut raw = ByteRecord::new();
    if !reader.read_byte_record(&mut raw)? {
        return Err(ConvertError::EmptyInput {
            input: input_name.to_string(),
        });
    }
    let header: Vec<FieldName> = raw
        .iter()
        .map(|cell| decode(cell, config.encoding))
        .collect();

    let mut rows = Vec::new();
    while reader.read_byte_record(&mut raw)? {
        if raw.len() > header.len() {
            debug!(
                row = rows.len(),
                cells = raw.len(),
                columns = header.len(),
                "[darwin_kml:reader] ignoring cells beyond the header"
            );
        }
        let fields: FieldMap = header
            .iter()
            .zip(raw.iter())
            .map(|(name, cell)| (name.clone(), decode(cell, config.encoding)))
            .collect();
        rows.push(fields);
    }

    if rows.is_empty() {
        warn!(
            input = input_name,
            "[darwin_kml:reader] only the header row exists"
        );
    }
    Ok(rows)
}

/// Open `path` and read it with [`read_records`].
pub fn read_records_from_path(
    path: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<Vec<FieldMap>, ConvertError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_records(BufReader::new(file), &path.display().to_string(), config)
}

fn decode(cell: &[u8], encoding: InputEncoding) -> String {
    match encoding {
        InputEncoding::Latin1 => cell.iter().map(|&byte| char::from(byte)).collect(),
        InputEncoding::Utf8 => String::from_utf8_lossy(cell).into_owned(),
    }
}
