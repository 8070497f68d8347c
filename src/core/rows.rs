use crate::utils::error::Result;
use serde::de::DeserializeOwned;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Deserializes every row by header name. Rows shorter than the header are
/// padded with empty cells and longer ones are cut to the header width, so a
/// trailing optional column may be left off.
pub(crate) fn read_rows<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(bytes));
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let mut record = record?;
        while record.len() < headers.len() {
            record.push_field("");
        }
        record.truncate(headers.len());
        rows.push(record.deserialize(Some(&headers))?);
    }
    Ok(rows)
}
