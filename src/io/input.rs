use std::path::Path;

use tracing::{debug, warn};

use crate::error::InputError;
use crate::io::docx::read_docx_paragraphs;

/// Supported transcript file formats. The extension is the only thing that
/// decides whether a file is accepted and how it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    WordDocument,
}

impl DocumentKind {
    /// Format implied by the text after the last `.` in the filename
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "docx" => Some(Self::WordDocument),
            _ => None,
        }
    }
}

/// Whether the filename carries an allowed extension (case-insensitive)
pub fn allowed_file(filename: &str) -> bool {
    DocumentKind::from_filename(filename).is_some()
}

/// Read a transcript file into a single string.
///
/// Returns `None` on any failure (missing file, bad encoding, corrupt
/// document, unsupported extension); the cause is logged.
pub fn read_file(path: &Path) -> Option<String> {
    let kind = DocumentKind::from_filename(&path.to_string_lossy())?;

    match kind {
        DocumentKind::PlainText => match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to read text file {:?}: {}", path, e);
                None
            }
        },
        DocumentKind::WordDocument => match read_docx_paragraphs(path) {
            Ok(paragraphs) => {
                debug!("Read {} paragraphs from {:?}", paragraphs.len(), path);
                Some(paragraphs.join("\n"))
            }
            Err(e) => {
                warn!("Failed to read document {:?}: {}", path, e);
                None
            }
        },
    }
}

/// Validate the input path and load the transcript.
///
/// Checks run in a fixed order: existence, extension, then content.
pub fn load_transcript(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound);
    }

    if !allowed_file(&path.to_string_lossy()) {
        return Err(InputError::UnsupportedType);
    }

    match read_file(path) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(InputError::ReadFailed),
    }
}
