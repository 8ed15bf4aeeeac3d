//! CSV Row Parser
//! Character-level state machine shared by the header and data passes.
//!
//! The machine walks a Source's whole text rather than pre-split lines, so a
//! quoted field may span physical lines. Rules:
//!
//! - `,` separates fields outside quotes, `\n` ends a row outside quotes.
//! - `"` toggles between the two states; inside quotes a doubled `""` is a
//!   literal quote and every other character is literal content.
//! - Whitespace at the edges of unquoted content is trimmed; quoted content
//!   is kept exactly.

use super::error::{ParseError, ParseErrorKind};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideQuotes,
    InsideQuotes,
}

/// One non-blank row as parsed from a Source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line on which the row starts.
    pub line: usize,
    pub fields: Vec<String>,
}

struct RawRow {
    line: usize,
    fields: Vec<String>,
    blank: bool,
}

/// Field being accumulated by the state machine.
#[derive(Default)]
struct FieldBuf {
    value: String,
    quoted: bool,
    /// Length of `value` when the last quoted span closed. Trimming never
    /// reaches below this mark.
    protected: usize,
}

impl FieldBuf {
    fn open_quote(&mut self) {
        if !self.quoted {
            let lead = self.value.len() - self.value.trim_start().len();
            self.value.drain(..lead);
            self.quoted = true;
        }
    }

    fn close_quote(&mut self) {
        self.protected = self.value.len();
    }

    fn is_blank(&self) -> bool {
        !self.quoted && self.value.trim().is_empty()
    }

    fn finish(&mut self) -> String {
        let mut value = std::mem::take(&mut self.value);
        if self.quoted {
            let keep = self.protected + value[self.protected..].trim_end().len();
            value.truncate(keep);
        } else {
            let end = value.trim_end().len();
            value.truncate(end);
            let lead = value.len() - value.trim_start().len();
            value.drain(..lead);
        }
        self.quoted = false;
        self.protected = 0;
        value
    }
}

/// Iterator over the non-blank rows of a CSV text.
///
/// Blank rows (a single unquoted field holding only whitespace) are skipped.
/// An unterminated quote yields one `Err` and ends the iteration.
pub struct Rows<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Rows<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    /// Read the next physical row, blank or not.
    fn read_row(&mut self) -> Option<Result<RawRow, ParseError>> {
        self.chars.peek()?;

        let start = self.line;
        let mut state = State::OutsideQuotes;
        let mut fields = Vec::new();
        let mut field = FieldBuf::default();

        while let Some(c) = self.chars.next() {
            match state {
                State::InsideQuotes => match c {
                    '"' if self.chars.peek() == Some(&'"') => {
                        self.chars.next();
                        field.value.push('"');
                    }
                    '"' => {
                        field.close_quote();
                        state = State::OutsideQuotes;
                    }
                    '\n' => {
                        self.line += 1;
                        field.value.push(c);
                    }
                    _ => field.value.push(c),
                },
                State::OutsideQuotes => match c {
                    '"' => {
                        field.open_quote();
                        state = State::InsideQuotes;
                    }
                    ',' => fields.push(field.finish()),
                    '\n' => {
                        self.line += 1;
                        break;
                    }
                    _ => field.value.push(c),
                },
            }
        }

        if state == State::InsideQuotes {
            return Some(Err(ParseError {
                line: start,
                kind: ParseErrorKind::UnterminatedQuote,
            }));
        }

        let blank = fields.is_empty() && field.is_blank();
        fields.push(field.finish());
        Some(Ok(RawRow {
            line: start,
            fields,
            blank,
        }))
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<ParsedRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_row()? {
                Ok(row) if row.blank => continue,
                Ok(row) => {
                    return Some(Ok(ParsedRow {
                        line: row.line,
                        fields: row.fields,
                    }))
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse all non-blank rows of `text`.
pub fn parse_rows(text: &str) -> Result<Vec<ParsedRow>, ParseError> {
    Rows::new(text).collect()
}

/// Parse a single record. An empty input is one empty field.
pub fn parse_record(text: &str) -> Result<Vec<String>, ParseError> {
    match Rows::new(text).read_row() {
        Some(row) => row.map(|r| r.fields),
        None => Ok(vec![String::new()]),
    }
}
