//! Plain-language explanations of the terms used in every summary.

use summarygen_docx::{Document, HeadingLevel};

/// Heading introducing the glossary block.
pub const GLOSSARY_HEADING: &str = "Technical Terms Explained";

/// One explained term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub term: &'static str,
    pub definition: &'static str,
    pub explanation: &'static str,
    pub example: &'static str,
}

/// The fixed glossary, in the order it appears in every document.
pub const GLOSSARY: [GlossaryEntry; 4] = [
    GlossaryEntry {
        term: "Completion Code",
        definition: "A code that indicates the status or result of a project or task.",
        explanation: "It helps track whether a project is finished, pending, or needs further action.",
        example: "For example, a completion code of 'DONE' means the project is finished, while 'PENDING' means it is still in progress.",
    },
    GlossaryEntry {
        term: "Affected Customers",
        definition: "The people or organizations impacted by the project or issue.",
        explanation: "This term shows who will benefit from or be influenced by the project's outcome.",
        example: "For example, if a software update fixes a bug, the affected customers are those who use that software.",
    },
    GlossaryEntry {
        term: "State",
        definition: "The current condition or phase of the project.",
        explanation: "It tells you if the project is new, ongoing, completed, or on hold.",
        example: "For example, a project in the 'Active' state is currently being worked on, while 'Closed' means it is finished.",
    },
    GlossaryEntry {
        term: "Description",
        definition: "A detailed explanation of the project or issue.",
        explanation: "It helps everyone understand what the project is about and what it aims to achieve.",
        example: "For example, a description might say: 'This project upgrades the company website to improve speed and security.'",
    },
];

/// Append the glossary heading and all four entries.
pub(crate) fn append_glossary(doc: &mut Document) {
    doc.add_heading(GLOSSARY_HEADING, HeadingLevel::H2);
    for entry in &GLOSSARY {
        doc.add_heading(entry.term, HeadingLevel::H3)
            .add_paragraph(format!("Definition: {}", entry.definition))
            .add_paragraph(format!("Explanation: {}", entry.explanation))
            .add_paragraph(format!("Example: {}", entry.example));
    }
}
