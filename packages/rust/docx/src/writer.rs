//! WordprocessingML (`.docx`) package writer.
//!
//! Output is deterministic: zip entries carry the fixed DOS epoch timestamp and
//! the core properties part has no created/modified dates, so the same
//! [`Document`] always serializes to the same bytes.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use summarygen_shared::{Result, SummaryError};

use crate::model::{Block, Document, HeadingLevel, Table};

/// MIME type of the generated artifacts.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Usable text width of a Letter page with 1" margins, in twentieths of a point.
const TEXT_WIDTH_TWIPS: usize = 9360;

/// Package-level properties written to `docProps/core.xml`.
#[derive(Debug, Clone, Default)]
pub struct DocxOptions {
    pub title: Option<String>,
    pub creator: Option<String>,
}

/// Serialize a document into an in-memory `.docx` package.
#[instrument(skip_all, fields(blocks = doc.blocks().len()))]
pub fn to_docx(doc: &Document, opts: &DocxOptions) -> Result<Vec<u8>> {
    let body = document_xml(doc)?;
    let core = core_xml(opts)?;

    let parts: [(&str, &[u8]); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("docProps/core.xml", core.as_bytes()),
        ("docProps/app.xml", APP_XML.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/document.xml", &body),
    ];

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        zip.start_file(name, options)
            .map_err(|e| SummaryError::serialize(format!("failed to start {name}: {e}")))?;
        zip.write_all(data)
            .map_err(|e| SummaryError::serialize(format!("failed to write {name}: {e}")))?;
    }

    let bytes = zip
        .finish()
        .map_err(|e| SummaryError::serialize(format!("failed to finish package: {e}")))?
        .into_inner();

    debug!(size = bytes.len(), "docx package written");
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// word/document.xml
// ---------------------------------------------------------------------------

fn xml_err(e: impl std::fmt::Display) -> SummaryError {
    SummaryError::serialize(format!("XML write failed: {e}"))
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Reject text that cannot appear in an XML document, even escaped.
fn check_xml_text(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(SummaryError::serialize(format!(
            "text contains U+{:04X}, which is not allowed in a document: {text:?}",
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

fn start(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
}

fn empty(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut elem = BytesStart::new(name);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    w.write_event(Event::Empty(elem)).map_err(xml_err)
}

fn document_xml(doc: &Document) -> Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", W_NS));
    w.write_event(Event::Start(root)).map_err(xml_err)?;
    start(&mut w, "w:body")?;

    for block in doc.blocks() {
        match block {
            Block::Heading { level, text } => write_paragraph(&mut w, Some(*level), text, false)?,
            Block::Paragraph(text) => write_paragraph(&mut w, None, text, false)?,
            Block::Table(table) => write_table(&mut w, table)?,
            Block::PageBreak => write_page_break(&mut w)?,
        }
    }

    // Letter page, 1" margins.
    start(&mut w, "w:sectPr")?;
    empty(&mut w, "w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    empty(
        &mut w,
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    end(&mut w, "w:sectPr")?;

    end(&mut w, "w:body")?;
    end(&mut w, "w:document")?;
    Ok(w.into_inner())
}

fn write_paragraph(
    w: &mut Writer<Vec<u8>>,
    style: Option<HeadingLevel>,
    text: &str,
    bold: bool,
) -> Result<()> {
    start(w, "w:p")?;
    if let Some(level) = style {
        start(w, "w:pPr")?;
        empty(w, "w:pStyle", &[("w:val", level.style_id())])?;
        end(w, "w:pPr")?;
    }
    if !text.is_empty() {
        write_run(w, text, bold)?;
    }
    end(w, "w:p")
}

/// Write one run; embedded newlines become line breaks.
fn write_run(w: &mut Writer<Vec<u8>>, text: &str, bold: bool) -> Result<()> {
    check_xml_text(text)?;
    start(w, "w:r")?;
    if bold {
        start(w, "w:rPr")?;
        empty(w, "w:b", &[])?;
        end(w, "w:rPr")?;
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            empty(w, "w:br", &[])?;
        }
        if line.is_empty() {
            continue;
        }
        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        w.write_event(Event::Start(t)).map_err(xml_err)?;
        w.write_event(Event::Text(BytesText::new(line)))
            .map_err(xml_err)?;
        end(w, "w:t")?;
    }
    end(w, "w:r")
}

fn write_page_break(w: &mut Writer<Vec<u8>>) -> Result<()> {
    start(w, "w:p")?;
    start(w, "w:r")?;
    empty(w, "w:br", &[("w:type", "page")])?;
    end(w, "w:r")?;
    end(w, "w:p")
}

fn write_table(w: &mut Writer<Vec<u8>>, table: &Table) -> Result<()> {
    let cols = table.column_count().max(1);
    let col_width = (TEXT_WIDTH_TWIPS / cols).to_string();

    start(w, "w:tbl")?;
    start(w, "w:tblPr")?;
    empty(w, "w:tblStyle", &[("w:val", "TableGrid")])?;
    empty(w, "w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    empty(
        w,
        "w:tblLook",
        &[("w:val", "04A0"), ("w:firstRow", "1"), ("w:noVBand", "1")],
    )?;
    end(w, "w:tblPr")?;

    start(w, "w:tblGrid")?;
    for _ in 0..cols {
        empty(w, "w:gridCol", &[("w:w", col_width.as_str())])?;
    }
    end(w, "w:tblGrid")?;

    write_row(w, &table.header, cols, &col_width, true)?;
    for row in &table.rows {
        write_row(w, row, cols, &col_width, false)?;
    }

    end(w, "w:tbl")
}

fn write_row(
    w: &mut Writer<Vec<u8>>,
    cells: &[String],
    cols: usize,
    col_width: &str,
    header: bool,
) -> Result<()> {
    start(w, "w:tr")?;
    if header {
        start(w, "w:trPr")?;
        empty(w, "w:tblHeader", &[])?;
        end(w, "w:trPr")?;
    }
    for i in 0..cols {
        let text = cells.get(i).map(String::as_str).unwrap_or("");
        start(w, "w:tc")?;
        start(w, "w:tcPr")?;
        empty(w, "w:tcW", &[("w:w", col_width), ("w:type", "dxa")])?;
        end(w, "w:tcPr")?;
        // Every cell needs at least one paragraph.
        write_paragraph(w, None, text, header)?;
        end(w, "w:tc")?;
    }
    end(w, "w:tr")
}

// ---------------------------------------------------------------------------
// Static package parts
// ---------------------------------------------------------------------------

fn core_xml(opts: &DocxOptions) -> Result<String> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(title) = &opts.title {
        check_xml_text(title)?;
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape(title.as_str())));
    }
    if let Some(creator) = &opts.creator {
        check_xml_text(creator)?;
        xml.push_str(&format!(
            "<dc:creator>{}</dc:creator>",
            escape(creator.as_str())
        ));
    }
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>summarygen</Application></Properties>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:color w:val="17365D"/><w:sz w:val="52"/><w:szCs w:val="52"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="365F91"/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:color w:val="4F81BD"/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:color w:val="4F81BD"/></w:rPr></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style></w:styles>"#;
