use std::io;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Serializer;

use crate::models::{error_record, CombinedReport};

const REPORT_INDENT: &[u8] = b"    ";

/// Compact formatter using `", "` and `": "` separators
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_string_with<F: Formatter>(value: &impl Serialize, formatter: F) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buf).context("Serialized JSON is not UTF-8")
}

/// Render the report as JSON indented by four spaces
pub fn render_report(report: &CombinedReport) -> Result<String> {
    to_string_with(report, PrettyFormatter::with_indent(REPORT_INDENT))
}

/// Render a one-line `{"error": message}` object
pub fn render_error(message: &str) -> Result<String> {
    to_string_with(&error_record(message), SpacedFormatter)
}
