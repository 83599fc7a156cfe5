//! In-memory document model: headings, paragraphs, tables and page breaks.

/// Heading nesting level, from the document title down to third-level headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    Title,
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Paragraph style id used in `word/styles.xml`.
    pub fn style_id(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::H1 => "Heading1",
            Self::H2 => "Heading2",
            Self::H3 => "Heading3",
        }
    }

    pub fn from_style_id(id: &str) -> Option<Self> {
        match id {
            "Title" => Some(Self::Title),
            "Heading1" => Some(Self::H1),
            "Heading2" => Some(Self::H2),
            "Heading3" => Some(Self::H3),
            _ => None,
        }
    }
}

/// A simple table: one header row followed by body rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Number of columns (the widest of the header and body rows).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// One top-level element of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: HeadingLevel, text: String },
    Paragraph(String),
    Table(Table),
    PageBreak,
}

/// An ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: HeadingLevel) -> &mut Self {
        self.push(Block::Heading {
            level,
            text: text.into(),
        })
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Block::Paragraph(text.into()))
    }

    pub fn add_table(&mut self, table: Table) -> &mut Self {
        self.push(Block::Table(table))
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.push(Block::PageBreak)
    }

    /// Append another document's content after this one's.
    pub fn extend(&mut self, other: Document) -> &mut Self {
        self.blocks.extend(other.blocks);
        self
    }

    pub fn headings(&self) -> impl Iterator<Item = (HeadingLevel, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn page_break_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
