pub mod docx;
pub mod input;
pub mod output;

pub use docx::{parse_document_xml, read_docx_paragraphs};
pub use input::*;
pub use output::*;
