//! Project summary documents: one per record, or all records combined.
//!
//! Both builders share [`append_record_section`], so a record's section in the
//! combined document is identical to its standalone document.

use tracing::{debug, instrument};

use summarygen_docx::{Document, DocxOptions, HeadingLevel, Table, to_docx};
use summarygen_shared::{Field, ProjectRecord, Result};

use crate::glossary::append_glossary;

/// Title heading of the combined document.
pub const COMBINED_TITLE: &str = "All Project Summaries";

/// Header cells of the details table.
pub const DETAILS_HEADER: [&str; 2] = ["Field", "Details"];

/// Fields listed in the details table, in row order.
pub const DETAIL_FIELDS: [Field; 5] = [
    Field::PNumber,
    Field::Description,
    Field::AffectedCustomers,
    Field::State,
    Field::CompletionCode,
];

/// Package properties shared by every rendered artifact.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Creator written to the document properties.
    pub creator: Option<String>,
}

/// Heading text of a record's section.
pub fn record_title(record: &ProjectRecord) -> String {
    format!("Project Summary: {}", record.resolve(Field::PNumber))
}

/// The `Field | Details` table for one record, fallbacks applied.
pub fn details_table(record: &ProjectRecord) -> Table {
    let mut table = Table::new(DETAILS_HEADER);
    for field in DETAIL_FIELDS {
        table.add_row([field.label(), record.resolve(field)]);
    }
    table
}

/// Append one record's section: title, short description, details table and glossary.
fn append_record_section(doc: &mut Document, record: &ProjectRecord) {
    doc.add_heading(record_title(record), HeadingLevel::H1)
        .add_heading(record.resolve(Field::ShortDescription), HeadingLevel::H2)
        .add_table(details_table(record));
    append_glossary(doc);
}

/// Build the summary document for a single record.
pub fn build_record_document(record: &ProjectRecord) -> Document {
    let mut doc = Document::new();
    append_record_section(&mut doc, record);
    doc
}

/// Build one document covering every record, in order, separated by page breaks.
pub fn build_combined_document(records: &[ProjectRecord]) -> Document {
    let mut doc = Document::new();
    doc.add_heading(COMBINED_TITLE, HeadingLevel::Title);

    for (idx, record) in records.iter().enumerate() {
        append_record_section(&mut doc, record);
        if idx + 1 < records.len() {
            doc.add_page_break();
        }
    }

    doc
}

/// Build and serialize a single record's summary.
#[instrument(skip_all, fields(p_number = record.resolve(Field::PNumber)))]
pub fn render_record(record: &ProjectRecord, opts: &RenderOptions) -> Result<Vec<u8>> {
    let doc = build_record_document(record);
    let bytes = to_docx(
        &doc,
        &DocxOptions {
            title: Some(record_title(record)),
            creator: opts.creator.clone(),
        },
    )?;
    debug!(size = bytes.len(), "record summary rendered");
    Ok(bytes)
}

/// Build and serialize the combined summary.
#[instrument(skip_all, fields(records = records.len()))]
pub fn render_combined(records: &[ProjectRecord], opts: &RenderOptions) -> Result<Vec<u8>> {
    let doc = build_combined_document(records);
    let bytes = to_docx(
        &doc,
        &DocxOptions {
            title: Some(COMBINED_TITLE.to_string()),
            creator: opts.creator.clone(),
        },
    )?;
    debug!(size = bytes.len(), "combined summary rendered");
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::{GLOSSARY, GLOSSARY_HEADING};
    use summarygen_docx::{Block, from_docx};
    use summarygen_shared::{CellValue, Row};

    fn p100() -> ProjectRecord {
        ProjectRecord::from_row(&Row::from_pairs([
            ("p_number", CellValue::from("P100")),
            ("short_description", CellValue::from("Upgrade")),
            ("description", CellValue::from("desc")),
            ("affected_customers", CellValue::Int(5)),
            ("state", CellValue::from("Active")),
            ("completion_code", CellValue::from("DONE")),
        ]))
    }

    fn rows(table: &Table) -> Vec<(&str, &str)> {
        table
            .rows
            .iter()
            .map(|r| (r[0].as_str(), r[1].as_str()))
            .collect()
    }

    /// Extract the glossary blocks following each glossary heading.
    fn glossary_blocks(doc: &Document) -> Vec<&[Block]> {
        let blocks = doc.blocks();
        blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Heading { text, .. } if text == GLOSSARY_HEADING))
            .map(|(i, _)| &blocks[i..i + 1 + GLOSSARY.len() * 4])
            .collect()
    }

    #[test]
    fn single_record_layout() {
        let doc = build_record_document(&p100());
        let blocks = doc.blocks();

        assert_eq!(
            blocks[0],
            Block::Heading {
                level: HeadingLevel::H1,
                text: "Project Summary: P100".into()
            }
        );
        assert_eq!(
            blocks[1],
            Block::Heading {
                level: HeadingLevel::H2,
                text: "Upgrade".into()
            }
        );
        let Block::Table(table) = &blocks[2] else {
            panic!("expected details table, got {:?}", blocks[2]);
        };
        assert_eq!(table.header, ["Field", "Details"]);
        assert_eq!(
            rows(table),
            [
                ("Project Number", "P100"),
                ("Description", "desc"),
                ("Affected Customers", "5"),
                ("State", "Active"),
                ("Completion Code", "DONE"),
            ]
        );
        assert_eq!(glossary_blocks(&doc).len(), 1);
        assert_eq!(blocks.len(), 3 + 1 + GLOSSARY.len() * 4);
        assert_eq!(doc.page_break_count(), 0);
    }

    #[test]
    fn empty_record_uses_fallbacks() {
        let doc = build_record_document(&ProjectRecord::default());
        let headings: Vec<_> = doc.headings().take(2).map(|(_, t)| t).collect();
        assert_eq!(headings, ["Project Summary: N/A", "No title provided"]);

        let table = doc.tables().next().unwrap();
        assert_eq!(
            rows(table),
            [
                ("Project Number", "N/A"),
                ("Description", "Not available"),
                ("Affected Customers", "Not available"),
                ("State", "Not available"),
                ("Completion Code", "Not available"),
            ]
        );
    }

    #[test]
    fn partial_record_mixes_values_and_fallbacks() {
        let record = ProjectRecord::from_row(&Row::from_pairs([
            ("p_number", CellValue::from("P7")),
            ("state", CellValue::from("")),
            ("affected_customers", CellValue::Float(12.0)),
        ]));
        let table = details_table(&record);
        assert_eq!(
            rows(&table),
            [
                ("Project Number", "P7"),
                ("Description", "Not available"),
                ("Affected Customers", "12"),
                ("State", "Not available"),
                ("Completion Code", "Not available"),
            ]
        );
    }

    #[test]
    fn combined_empty_table_has_only_title() {
        let doc = build_combined_document(&[]);
        assert_eq!(
            doc.blocks(),
            &[Block::Heading {
                level: HeadingLevel::Title,
                text: COMBINED_TITLE.into()
            }]
        );
        assert_eq!(doc.page_break_count(), 0);
    }

    #[test]
    fn combined_has_n_minus_one_breaks_and_n_glossaries() {
        let records: Vec<_> = (1..=3)
            .map(|i| ProjectRecord {
                p_number: Some(format!("P{i}")),
                ..Default::default()
            })
            .collect();
        let doc = build_combined_document(&records);

        assert_eq!(doc.page_break_count(), 2);
        let glossaries = glossary_blocks(&doc);
        assert_eq!(glossaries.len(), 3);
        assert!(glossaries.windows(2).all(|w| w[0] == w[1]));
        assert!(!matches!(doc.blocks().last(), Some(Block::PageBreak)));
    }

    #[test]
    fn combined_sections_match_single_documents() {
        let records = vec![
            p100(),
            ProjectRecord {
                p_number: Some("P200".into()),
                ..Default::default()
            },
        ];
        let doc = build_combined_document(&records);

        let mut expected = Document::new();
        expected.add_heading(COMBINED_TITLE, HeadingLevel::Title);
        expected.extend(build_record_document(&records[0]));
        expected.add_page_break();
        expected.extend(build_record_document(&records[1]));

        assert_eq!(doc, expected);
    }

    #[test]
    fn single_record_is_deterministic() {
        let opts = RenderOptions {
            creator: Some("tests".into()),
        };
        assert_eq!(build_record_document(&p100()), build_record_document(&p100()));
        assert_eq!(
            render_record(&p100(), &opts).unwrap(),
            render_record(&p100(), &opts).unwrap()
        );
    }

    #[test]
    fn rendered_artifacts_read_back() {
        let record = p100();
        let bytes = render_record(&record, &RenderOptions::default()).unwrap();
        assert_eq!(from_docx(&bytes).unwrap(), build_record_document(&record));

        let records = vec![record.clone(), record];
        let bytes = render_combined(&records, &RenderOptions::default()).unwrap();
        let doc = from_docx(&bytes).unwrap();
        assert_eq!(doc.page_break_count(), 1);
        assert_eq!(doc, build_combined_document(&records));
    }

    #[test]
    fn control_characters_fail_rendering() {
        let record = ProjectRecord {
            p_number: Some("P9".into()),
            description: Some("line\u{0b}tab\u{01}x".into()),
            ..Default::default()
        };
        let err = render_record(&record, &RenderOptions::default()).unwrap_err();
        assert!(err.to_string().contains("U+000B"));
        assert!(render_combined(&[record], &RenderOptions::default()).is_err());
    }
}
