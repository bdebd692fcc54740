//! Paragraph text extraction from Office Open XML word-processor documents.
//!
//! A `.docx` is a zip archive; the body lives in `word/document.xml` as a
//! sequence of `w:p` paragraphs made of `w:r` runs holding `w:t` text. Only
//! paragraphs directly in the body are read. Tables, text boxes, headers,
//! footers and styling are ignored.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read every body paragraph of a `.docx` file, in document order
pub fn read_docx_paragraphs(path: &Path) -> Result<Vec<String>, DocumentError> {
    let file = File::open(path)?;
    read_paragraphs_from(file)
}

/// Same as [`read_docx_paragraphs`] for any seekable archive source
pub fn read_paragraphs_from<R: Read + Seek>(source: R) -> Result<Vec<String>, DocumentError> {
    let mut archive = zip::ZipArchive::new(source)?;

    let mut xml = String::new();
    match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            part.read_to_string(&mut xml)?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(DocumentError::MissingPart(DOCUMENT_PART));
        }
        Err(e) => return Err(e.into()),
    }

    parse_document_xml(&xml)
}

/// Extract body paragraph text from the main document part
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth inside containers whose paragraphs are not body paragraphs
    let mut nested = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocumentError::Xml(e.to_string()))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => nested += 1,
                b"p" if nested == 0 => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if nested == 0 => paragraphs.push(String::new()),
                b"tab" => push_to(&mut current, nested, "\t"),
                b"br" | b"cr" => push_to(&mut current, nested, "\n"),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|e| DocumentError::Xml(e.to_string()))?;
                push_to(&mut current, nested, &text);
            }
            Event::CData(data) if in_text => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_to(&mut current, nested, &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => nested = nested.saturating_sub(1),
                b"p" if nested == 0 => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_to(current: &mut Option<String>, nested: usize, text: &str) {
    if nested > 0 {
        return;
    }
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}
