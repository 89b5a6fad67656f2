//! CSV serialization of the consolidated table.
//!
//! Layout: a `Date` header followed by one column per asset, dates as
//! `YYYY-MM-DD`, null cells left empty.

use std::io::Write;

use pricebook_core::{ConsolidatedTable, Result, DATE_COLUMN};

/// Render a price in its shortest round-trip decimal form.
pub fn format_value(value: f64) -> String {
    value.to_string()
}

/// Write `table` as CSV. Returns the number of data rows written.
pub fn write_csv<W: Write>(table: &ConsolidatedTable, writer: W) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.assets().len() + 1);
    header.push(DATE_COLUMN);
    header.extend(table.assets().iter().map(String::as_str));
    out.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for (date, cells) in table.rows() {
        record.clear();
        record.push(date.to_string());
        record.extend(cells.iter().map(|cell| cell.map(format_value).unwrap_or_default()));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(table.len())
}
