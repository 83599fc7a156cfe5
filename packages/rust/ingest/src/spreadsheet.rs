//! Excel workbook tables via `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use summarygen_shared::{CellValue, ProjectTable, Result, Row, SummaryError};

/// Read one worksheet (by name, or the first sheet) as a table whose first
/// row is the header.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<ProjectTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| SummaryError::ingest(format!("failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                SummaryError::ingest(format!(
                    "worksheet '{name}' not found (available: {})",
                    sheet_names.join(", ")
                ))
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SummaryError::ingest("workbook contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SummaryError::ingest(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let (height, width) = range.get_size();
    debug!(sheet = %sheet_name, height, width, "worksheet loaded");

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for cells in rows_iter {
        let mut row = Row::new();
        for (column, cell) in columns.iter().zip(cells) {
            if column.is_empty() {
                continue;
            }
            row.insert(column.clone(), cell_value(cell));
        }
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(ProjectTable { columns, rows })
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates, durations and error cells are kept as their display text.
        other => CellValue::from(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("summarygen-xlsx-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Projects").unwrap();
        for (col, name) in ["p_number", "short_description", "affected_customers"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "P100").unwrap();
        sheet.write_string(1, 1, "Upgrade").unwrap();
        sheet.write_number(1, 2, 5).unwrap();
        sheet.write_string(2, 0, "P200").unwrap();
        sheet.write_number(2, 2, 2.5).unwrap();

        let other = workbook.add_worksheet();
        other.set_name("Notes").unwrap();
        other.write_string(0, 0, "p_number").unwrap();
        other.write_string(1, 0, "N1").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_first_sheet_by_default() {
        let path = temp_path("projects.xlsx");
        write_fixture(&path);

        let table = read_workbook(&path, None).unwrap();
        assert_eq!(
            table.columns,
            ["p_number", "short_description", "affected_customers"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("p_number"),
            Some(&CellValue::Text("P100".into()))
        );
        let customers = table.rows[0].get("affected_customers").unwrap();
        assert_eq!(customers.to_text().as_deref(), Some("5"));
        assert!(table.rows[1].get("short_description").unwrap().is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn reads_named_sheet() {
        let path = temp_path("projects.xlsx");
        write_fixture(&path);

        let table = read_workbook(&path, Some("Notes")).unwrap();
        assert_eq!(table.rows.len(), 1);

        let err = read_workbook(&path, Some("Missing")).unwrap_err();
        assert!(err.to_string().contains("worksheet 'Missing' not found"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_workbook_is_ingest_error() {
        let path = temp_path("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        let err = read_workbook(&path, None).unwrap_err();
        assert!(matches!(err, SummaryError::Ingest { .. }));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
