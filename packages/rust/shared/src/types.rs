//! Core domain types: ingested cells and rows, and the project record built from them.

use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue
// ---------------------------------------------------------------------------

/// A single scalar cell as read from a spreadsheet or delimited file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// Coerce the cell to display text.
    ///
    /// Returns `None` for empty cells and empty strings so callers can apply
    /// a fallback. Integral floats drop their fractional part (`5.0` → `"5"`),
    /// since spreadsheets store every number as a float.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    /// Whether the cell carries no value.
    pub fn is_empty(&self) -> bool {
        self.to_text().is_none()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() { Self::Empty } else { Self::Text(s) }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Row / ProjectTable
// ---------------------------------------------------------------------------

/// One ingested row: column name → cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// True when every cell in the row is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

/// An ordered, row-oriented table as produced by ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectTable {
    /// Header names in source order.
    pub columns: Vec<String>,
    /// Rows in source order.
    pub rows: Vec<Row>,
}

impl ProjectTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Convert every row into a [`ProjectRecord`], preserving order.
    pub fn records(&self) -> Vec<ProjectRecord> {
        self.rows.iter().map(ProjectRecord::from_row).collect()
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// The six recognized project columns, each with its fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PNumber,
    ShortDescription,
    Description,
    AffectedCustomers,
    State,
    CompletionCode,
}

impl Field {
    /// All fields, in column order.
    pub const ALL: [Field; 6] = [
        Field::PNumber,
        Field::ShortDescription,
        Field::Description,
        Field::AffectedCustomers,
        Field::State,
        Field::CompletionCode,
    ];

    /// Column name in the input table (case-sensitive).
    pub fn column(self) -> &'static str {
        match self {
            Self::PNumber => "p_number",
            Self::ShortDescription => "short_description",
            Self::Description => "description",
            Self::AffectedCustomers => "affected_customers",
            Self::State => "state",
            Self::CompletionCode => "completion_code",
        }
    }

    /// Human-readable label used in the details table.
    pub fn label(self) -> &'static str {
        match self {
            Self::PNumber => "Project Number",
            Self::ShortDescription => "Short Description",
            Self::Description => "Description",
            Self::AffectedCustomers => "Affected Customers",
            Self::State => "State",
            Self::CompletionCode => "Completion Code",
        }
    }

    /// Text substituted when the field is absent or empty.
    pub fn fallback(self) -> &'static str {
        match self {
            Self::PNumber => "N/A",
            Self::ShortDescription => "No title provided",
            Self::Description
            | Self::AffectedCustomers
            | Self::State
            | Self::CompletionCode => "Not available",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Column names every input table is expected to carry.
pub fn expected_columns() -> impl Iterator<Item = &'static str> {
    Field::ALL.iter().map(|f| f.column())
}

// ---------------------------------------------------------------------------
// ProjectRecord
// ---------------------------------------------------------------------------

/// One project, with every recognized field already coerced to text.
///
/// `None` means the source cell was absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRecord {
    pub p_number: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub affected_customers: Option<String>,
    pub state: Option<String>,
    pub completion_code: Option<String>,
}

impl ProjectRecord {
    /// Read the recognized columns from a row. Other columns are ignored.
    pub fn from_row(row: &Row) -> Self {
        let text = |field: Field| row.get(field.column()).and_then(CellValue::to_text);
        Self {
            p_number: text(Field::PNumber),
            short_description: text(Field::ShortDescription),
            description: text(Field::Description),
            affected_customers: text(Field::AffectedCustomers),
            state: text(Field::State),
            completion_code: text(Field::CompletionCode),
        }
    }

    /// The raw value of a field, if present and non-empty.
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::PNumber => &self.p_number,
            Field::ShortDescription => &self.short_description,
            Field::Description => &self.description,
            Field::AffectedCustomers => &self.affected_customers,
            Field::State => &self.state,
            Field::CompletionCode => &self.completion_code,
        };
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// The field's value, or its fallback text when absent.
    pub fn resolve(&self, field: Field) -> &str {
        self.get(field).unwrap_or(field.fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_coerce_to_text() {
        assert_eq!(CellValue::Int(5).to_text().as_deref(), Some("5"));
        assert_eq!(CellValue::Float(5.0).to_text().as_deref(), Some("5"));
        assert_eq!(CellValue::Float(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(CellValue::Bool(true).to_text().as_deref(), Some("true"));
    }

    #[test]
    fn empty_text_counts_as_absent() {
        assert_eq!(CellValue::Text(String::new()).to_text(), None);
        assert_eq!(CellValue::from(""), CellValue::Empty);
        assert!(CellValue::Empty.is_empty());
    }

    #[test]
    fn record_from_row_ignores_unknown_columns() {
        let row = Row::from_pairs([
            ("p_number", CellValue::from("P100")),
            ("owner", CellValue::from("someone")),
            ("affected_customers", CellValue::Int(12)),
        ]);
        let record = ProjectRecord::from_row(&row);
        assert_eq!(record.p_number.as_deref(), Some("P100"));
        assert_eq!(record.affected_customers.as_deref(), Some("12"));
        assert_eq!(record.state, None);
    }

    #[test]
    fn resolve_applies_field_fallbacks() {
        let record = ProjectRecord::default();
        assert_eq!(record.resolve(Field::PNumber), "N/A");
        assert_eq!(record.resolve(Field::ShortDescription), "No title provided");
        for field in [
            Field::Description,
            Field::AffectedCustomers,
            Field::State,
            Field::CompletionCode,
        ] {
            assert_eq!(record.resolve(field), "Not available");
        }
    }

    #[test]
    fn resolve_treats_empty_string_as_missing() {
        let record = ProjectRecord {
            p_number: Some(String::new()),
            state: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(record.resolve(Field::PNumber), "N/A");
        assert_eq!(record.resolve(Field::State), "Not available");
    }

    #[test]
    fn blank_row_detection() {
        let row = Row::from_pairs([("p_number", ""), ("state", "")]);
        assert!(row.is_blank());
        let row = Row::from_pairs([("p_number", ""), ("state", "Active")]);
        assert!(!row.is_blank());
    }

    #[test]
    fn table_records_preserve_order() {
        let table = ProjectTable {
            columns: vec!["p_number".into()],
            rows: vec![
                Row::from_pairs([("p_number", "A")]),
                Row::from_pairs([("p_number", "B")]),
            ],
        };
        let ids: Vec<_> = table
            .records()
            .iter()
            .map(|r| r.resolve(Field::PNumber).to_string())
            .collect();
        assert_eq!(ids, ["A", "B"]);
        assert!(table.has_column("p_number"));
        assert!(!table.has_column("state"));
    }

    #[test]
    fn expected_columns_in_order() {
        let cols: Vec<_> = expected_columns().collect();
        assert_eq!(
            cols,
            [
                "p_number",
                "short_description",
                "description",
                "affected_customers",
                "state",
                "completion_code"
            ]
        );
    }
}
