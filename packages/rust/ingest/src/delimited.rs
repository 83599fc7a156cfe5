//! Comma- and tab-delimited text tables.

use summarygen_shared::{CellValue, ProjectTable, Result, Row, SummaryError};

const UTF8_BOM: char = '\u{feff}';

/// Decode raw file bytes, falling back to Windows-1252 for non-UTF-8 input
/// (common for CSVs exported from Excel).
pub(crate) fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Parse delimited text whose first record is the header row.
///
/// Short rows are padded with empty cells; extra trailing fields without a
/// header are dropped. Fully blank rows are skipped.
pub fn parse_delimited(content: &str, delimiter: u8) -> Result<ProjectTable> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SummaryError::ingest(format!("invalid header row: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SummaryError::ingest(e.to_string()))?;
        let mut row = Row::new();
        for (idx, column) in columns.iter().enumerate() {
            let value = record.get(idx).map(CellValue::from).unwrap_or_default();
            row.insert(column.clone(), value);
        }
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(ProjectTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_with_header() {
        let csv = "p_number,short_description,affected_customers\nP1,Upgrade,5\nP2,,\n";
        let table = parse_delimited(csv, b',').unwrap();
        assert_eq!(
            table.columns,
            ["p_number", "short_description", "affected_customers"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("affected_customers"),
            Some(&CellValue::Text("5".into()))
        );
        assert_eq!(table.rows[1].get("short_description"), Some(&CellValue::Empty));
    }

    #[test]
    fn tab_separated_keeps_commas_in_cells() {
        let tsv = "p_number\tdescription\nP9\tSlow, then fast\n";
        let table = parse_delimited(tsv, b'\t').unwrap();
        assert_eq!(
            table.rows[0].get("description"),
            Some(&CellValue::Text("Slow, then fast".into()))
        );
    }

    #[test]
    fn quoted_fields_and_short_rows() {
        let csv = "p_number,description,state\n\"P1\",\"multi\nline\"\nP2,x,Active\n";
        let table = parse_delimited(csv, b',').unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("description"),
            Some(&CellValue::Text("multi\nline".into()))
        );
        assert_eq!(table.rows[0].get("state"), Some(&CellValue::Empty));
    }

    #[test]
    fn bom_and_blank_rows_are_ignored() {
        let csv = "\u{feff}p_number,state\n,\nP3,Closed\n";
        let table = parse_delimited(csv, b',').unwrap();
        assert_eq!(table.columns[0], "p_number");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let table = parse_delimited("p_number,state\n", b',').unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn windows_1252_fallback() {
        // "Café" with 0xE9 for é
        let decoded = decode(vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(decoded, "Café");
    }
}
