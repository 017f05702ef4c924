//! Item lists from CSV uploads

use crate::utils::error::Result;
use std::io::Read;

/// First-row labels recognised as a header
const HEADER_LABELS: [&str; 5] = ["item", "phone", "phone_number", "npwp", "nik"];

/// Read the first column of every row
///
/// Blank rows are skipped, and so is a leading header row whose first cell is one of
/// `item`, `phone`, `phone_number`, `npwp` or `nik`.
pub fn parse_items<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut items = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(first) = record.get(0).filter(|cell| !cell.is_empty()) else {
            continue;
        };
        if items.is_empty() && is_header(first) {
            continue;
        }
        items.push(first.to_string());
    }

    Ok(items)
}

fn is_header(cell: &str) -> bool {
    let cell = cell.to_ascii_lowercase();
    HEADER_LABELS.contains(&cell.as_str())
}
