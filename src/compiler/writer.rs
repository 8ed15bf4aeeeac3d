//! Serializer
//! Renders a HeaderSet and NormalizedRecords back into CSV text.
//!
//! A field is quoted, with inner quotes doubled, only when it holds a comma,
//! a quote, a line break, or whitespace at either edge. Everything else is
//! written bare. The output reads back through the parser to the same values.

use super::headers::HeaderSet;
use super::normalizer::NormalizedRecord;
use std::borrow::Cow;
use std::io::{self, Write};

pub const DELIMITER: char = ',';
pub const QUOTE: char = '"';
pub const LINE_END: &str = "\n";

/// Whether `value` must be quoted to survive a parse.
pub fn needs_quotes(value: &str) -> bool {
    if value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        return true;
    }
    // Unquoted edges are trimmed by the parser.
    value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace)
}

/// Quote and escape a single field if needed.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !needs_quotes(value) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push(QUOTE);
    for c in value.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
    Cow::Owned(out)
}

/// Append one CSV line (with terminator) for `fields` to `out`.
pub fn format_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start = out.len();
    let mut count = 0;
    for field in fields {
        if count > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&escape_field(field.as_ref()));
        count += 1;
    }
    // A lone empty field would otherwise read back as a blank line.
    if count == 1 && out.len() == start {
        out.push_str("\"\"");
    }
    out.push_str(LINE_END);
}

/// CSV writer over any byte sink.
pub struct CsvWriter<W: Write> {
    inner: W,
    line: String,
    bytes_written: u64,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: String::new(),
            bytes_written: 0,
        }
    }

    pub fn write_record<I, S>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.line.clear();
        format_record(&mut self.line, fields);
        self.inner.write_all(self.line.as_bytes())?;
        self.bytes_written += self.line.len() as u64;
        Ok(())
    }

    /// Write the header line followed by every record.
    /// Nothing is written when there are no columns.
    pub fn write_all(&mut self, headers: &HeaderSet, records: &[NormalizedRecord]) -> io::Result<()> {
        if headers.is_empty() {
            return Ok(());
        }
        self.write_record(headers.iter())?;
        for record in records {
            self.write_record(record.values())?;
        }
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Render the full CSV text in memory. No columns renders as empty text.
pub fn to_csv_string(headers: &HeaderSet, records: &[NormalizedRecord]) -> String {
    let mut out = String::new();
    if headers.is_empty() {
        return out;
    }
    format_record(&mut out, headers.iter());
    for record in records {
        format_record(&mut out, record.values());
    }
    out
}
