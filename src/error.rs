use thiserror::Error;

/// Terminal input validation failures. The messages are user-facing and end
/// up verbatim in the `{"error": ...}` object printed by the binary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("File does not exist")]
    NotFound,

    #[error("Unsupported file type. Only .txt and .docx are allowed")]
    UnsupportedType,

    #[error("Failed to read file")]
    ReadFailed,
}

/// Failures while extracting paragraph text from a `.docx` archive.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Malformed document XML: {0}")]
    Xml(String),

    #[error("Document part not found: {0}")]
    MissingPart(&'static str),
}

/// Failures of the completion backend.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Unsupported provider '{0}'. Supported providers: canned, anthropic")]
    UnknownProvider(String),

    #[error("Failed to send request to Anthropic API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Anthropic API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("No text content in response")]
    EmptyResponse,
}
