//! Plain-text read-back of a document for on-screen previews.

use crate::model::{Block, Document};

/// Render a document as plain text.
///
/// Every heading and paragraph comes first, one per line (a page break
/// contributes an empty line), followed by every table row with its cells
/// joined by `" | "`.
pub fn preview_text(doc: &Document) -> String {
    let mut out = String::new();

    for block in doc.blocks() {
        match block {
            Block::Heading { text, .. } | Block::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Block::PageBreak => out.push('\n'),
            Block::Table(_) => {}
        }
    }

    for table in doc.tables() {
        for row in std::iter::once(&table.header).chain(&table.rows) {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
    }

    out
}
