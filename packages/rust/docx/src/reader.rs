//! Read a `.docx` package back into the document model.
//!
//! Only the structures the writer produces are recognized: styled headings,
//! plain paragraphs, page-break paragraphs and simple tables. Anything else
//! in the body degrades to paragraph text.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument};
use zip::ZipArchive;

use summarygen_shared::{Result, SummaryError};

use crate::model::{Block, Document, HeadingLevel, Table};

const DOCUMENT_PART: &str = "word/document.xml";

/// Parse an in-memory `.docx` package.
#[instrument(skip_all, fields(size = bytes.len()))]
pub fn from_docx(bytes: &[u8]) -> Result<Document> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SummaryError::parse(format!("not a docx package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| SummaryError::parse(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| SummaryError::parse(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    let doc = parse_document_xml(&xml)?;
    debug!(blocks = doc.blocks().len(), "docx package parsed");
    Ok(doc)
}

/// Paragraph being accumulated between `<w:p>` and `</w:p>`.
#[derive(Default)]
struct ParagraphState {
    style: Option<String>,
    text: String,
    page_break: bool,
}

impl ParagraphState {
    fn into_block(self) -> Block {
        if self.page_break && self.text.is_empty() {
            return Block::PageBreak;
        }
        match self.style.as_deref().and_then(HeadingLevel::from_style_id) {
            Some(level) => Block::Heading {
                level,
                text: self.text,
            },
            None => Block::Paragraph(self.text),
        }
    }
}

/// Table being accumulated between `<w:tbl>` and `</w:tbl>`.
#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    cell: Option<String>,
}

impl TableState {
    fn into_table(mut self) -> Table {
        if self.rows.is_empty() {
            return Table::default();
        }
        let header = self.rows.remove(0);
        Table {
            header,
            rows: self.rows,
        }
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_xml_entity(name).map(String::from)
}

fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut blocks = Vec::new();
    let mut paragraph: Option<ParagraphState> = None;
    let mut table: Option<TableState> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SummaryError::parse(format!("malformed document.xml: {e}")))?;

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(ParagraphState::default()),
                b"w:t" => in_text = true,
                b"w:tbl" if table.is_none() => table = Some(TableState::default()),
                b"w:tr" => {
                    if let Some(t) = table.as_mut() {
                        t.rows.push(Vec::new());
                    }
                }
                b"w:tc" => {
                    if let Some(t) = table.as_mut() {
                        t.cell = Some(String::new());
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:pStyle" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.style = attr(e, b"w:val");
                    }
                }
                b"w:br" => {
                    if let Some(p) = paragraph.as_mut() {
                        if attr(e, b"w:type").as_deref() == Some("page") {
                            p.page_break = true;
                        } else {
                            p.text.push('\n');
                        }
                    }
                }
                b"w:tab" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.text.push('\t');
                    }
                }
                b"w:p" => {
                    let p = ParagraphState::default();
                    finish_paragraph(p, table.as_mut(), &mut blocks);
                }
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    p.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(ref e) if in_text => {
                let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                let resolved = resolve_reference(&name).ok_or_else(|| {
                    SummaryError::parse(format!("unknown entity reference &{name};"))
                })?;
                if let Some(p) = paragraph.as_mut() {
                    p.text.push_str(&resolved);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        finish_paragraph(p, table.as_mut(), &mut blocks);
                    }
                }
                b"w:tc" => {
                    if let Some(t) = table.as_mut() {
                        let cell = t.cell.take().unwrap_or_default();
                        if let Some(row) = t.rows.last_mut() {
                            row.push(cell);
                        }
                    }
                }
                b"w:tbl" => {
                    if let Some(t) = table.take() {
                        blocks.push(Block::Table(t.into_table()));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Document::from(blocks))
}

/// Route a completed paragraph into the open table cell or the body.
fn finish_paragraph(p: ParagraphState, table: Option<&mut TableState>, blocks: &mut Vec<Block>) {
    match table.and_then(|t| t.cell.as_mut()) {
        Some(cell) => {
            if !cell.is_empty() {
                cell.push('\n');
            }
            cell.push_str(&p.text);
        }
        None => blocks.push(p.into_block()),
    }
}
