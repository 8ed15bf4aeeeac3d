//! Error types for a compilation run.

use std::io;
use thiserror::Error;

/// Fatal errors of a compilation run. Any of these aborts the whole run and
/// no partial result is returned.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to read source '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed row {row} in source '{name}': {reason}")]
    MalformedRow {
        name: String,
        row: usize,
        reason: String,
    },
    #[error("No CSV sources supplied")]
    EmptyInput,
}

impl CompileError {
    pub(crate) fn source_read(name: &str, source: io::Error) -> Self {
        CompileError::SourceRead {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(name: &str, err: ParseError) -> Self {
        CompileError::MalformedRow {
            name: name.to_string(),
            row: err.line,
            reason: err.kind.to_string(),
        }
    }
}

/// Parser-level failure, located by the line on which the bad row starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unterminated quoted field")]
    UnterminatedQuote,
}
