//! Structured document model and `.docx` (WordprocessingML) codec.
//!
//! Documents are built in memory as a flat list of [`Block`]s, serialized with
//! [`to_docx`] and read back with [`from_docx`]. The writer only emits the
//! primitives the reader understands, so a round trip is lossless.

mod model;
mod preview;
mod reader;
mod writer;

pub use model::{Block, Document, HeadingLevel, Table};
pub use preview::preview_text;
pub use reader::from_docx;
pub use writer::{DOCX_MIME, DocxOptions, to_docx};

/// File extension of generated artifacts.
pub const DOCX_EXTENSION: &str = "docx";
