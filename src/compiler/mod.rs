//! Compiler module - merge CSV sources onto one unioned header
//!
//! A run is two strictly ordered passes over the same Sources: the header
//! pass fixes the full HeaderSet, then the row pass projects every data row
//! onto it. A column seen only in a late Source still widens the rows of
//! earlier Sources, so no row is normalized before the header pass ends.

mod error;
mod headers;
mod normalizer;
mod parser;
mod source;
mod writer;

pub use error::{CompileError, ParseError, ParseErrorKind};
pub use headers::{read_header, HeaderCollector, HeaderSet};
pub use normalizer::{NormalizedRecord, Record, RowNormalizer};
pub use parser::{parse_record, parse_rows, ParsedRow, Rows};
pub use source::{has_allowed_extension, Source};
pub use writer::{escape_field, format_record, needs_quotes, to_csv_string, CsvWriter};

use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, info};

/// Options for a compilation run.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Parse header rows concurrently during the first pass.
    pub parallel_headers: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            parallel_headers: true,
        }
    }
}

/// Progress events emitted between the steps of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileProgress {
    HeadersCollected {
        columns: usize,
    },
    SourceNormalized {
        index: usize,
        total: usize,
        name: String,
        rows: usize,
    },
}

/// Counts reported back to callers after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileSummary {
    pub source_count: usize,
    pub total_rows: usize,
    pub total_columns: usize,
    pub headers: Vec<String>,
}

/// Output of one run: the final HeaderSet and every NormalizedRecord, in
/// Source order then row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledResult {
    headers: HeaderSet,
    records: Vec<NormalizedRecord>,
    source_count: usize,
}

impl CompiledResult {
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn summary(&self) -> CompileSummary {
        CompileSummary {
            source_count: self.source_count,
            total_rows: self.records.len(),
            total_columns: self.headers.len(),
            headers: self.headers.as_slice().to_vec(),
        }
    }

    /// Serialized CSV text.
    pub fn to_csv(&self) -> String {
        to_csv_string(&self.headers, &self.records)
    }

    /// Stream the serialized CSV into `out`, returning the byte count.
    pub fn write_csv<W: Write>(&self, out: W) -> io::Result<u64> {
        let mut writer = CsvWriter::new(out);
        writer.write_all(&self.headers, &self.records)?;
        writer.flush()?;
        debug!(bytes = writer.bytes_written(), "Wrote compiled CSV");
        Ok(writer.bytes_written())
    }
}

/// Entry point for compiling a list of Sources.
///
/// Holds no state between runs; every call builds and returns its own
/// HeaderSet and record list.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCompiler {
    options: CompileOptions,
}

impl CsvCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, sources: &[Source]) -> Result<CompiledResult, CompileError> {
        self.compile_with_progress(sources, |_| {})
    }

    pub fn compile_with_progress<F>(
        &self,
        sources: &[Source],
        mut on_progress: F,
    ) -> Result<CompiledResult, CompileError>
    where
        F: FnMut(CompileProgress),
    {
        if sources.is_empty() {
            return Err(CompileError::EmptyInput);
        }
        info!(sources = sources.len(), "Starting compilation");

        let headers = HeaderCollector::new(self.options.parallel_headers).collect(sources)?;
        info!(columns = headers.len(), "Header pass complete");
        on_progress(CompileProgress::HeadersCollected {
            columns: headers.len(),
        });

        let normalizer = RowNormalizer::new(&headers);
        let mut records = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            let rows = normalizer.normalize(source)?;
            on_progress(CompileProgress::SourceNormalized {
                index,
                total: sources.len(),
                name: source.name().to_string(),
                rows: rows.len(),
            });
            records.extend(rows);
        }

        info!(
            sources = sources.len(),
            rows = records.len(),
            columns = headers.len(),
            "Compilation complete"
        );
        Ok(CompiledResult {
            headers,
            records,
            source_count: sources.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(sources: &[Source]) -> Result<CompiledResult, CompileError> {
        CsvCompiler::default().compile(sources)
    }

    fn rows(result: &CompiledResult) -> Vec<Vec<&str>> {
        result
            .records()
            .iter()
            .map(|r| r.values().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn two_sources_with_overlapping_columns() {
        let sources = vec![
            Source::new("a.csv", "a,b\n1,2\n"),
            Source::new("b.csv", "b,c\n3,4\n"),
        ];
        let result = compile(&sources).unwrap();
        assert_eq!(result.headers().as_slice(), ["a", "b", "c"]);
        assert_eq!(rows(&result), vec![vec!["1", "2", ""], vec!["", "3", "4"]]);
        assert_eq!(result.to_csv(), "a,b,c\n1,2,\n,3,4\n");
    }

    #[test]
    fn quoted_comma_survives_round_trip() {
        let sources = vec![Source::new("q.csv", "first,second\n\"x,y\",z\n")];
        let result = compile(&sources).unwrap();
        assert_eq!(rows(&result), vec![vec!["x,y", "z"]]);
        assert_eq!(result.to_csv(), "first,second\n\"x,y\",z\n");
    }

    #[test]
    fn blank_line_between_rows_is_dropped() {
        let sources = vec![Source::new("gap.csv", "a\n1\n\n2\n")];
        let result = compile(&sources).unwrap();
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn short_row_gets_empty_trailing_column() {
        let sources = vec![Source::new("s.csv", "a,b,c\n1,2\n")];
        let result = compile(&sources).unwrap();
        assert_eq!(rows(&result), vec![vec!["1", "2", ""]]);
    }

    #[test]
    fn empty_source_list_is_rejected() {
        assert!(matches!(compile(&[]), Err(CompileError::EmptyInput)));
    }

    #[test]
    fn later_column_widens_earlier_rows() {
        let sources = vec![
            Source::new("early.csv", "id\n1\n2\n"),
            Source::new("late.csv", "id,extra\n3,x\n"),
        ];
        let result = compile(&sources).unwrap();
        assert!(result.records().iter().all(|r| r.len() == 2));
        assert_eq!(rows(&result), vec![vec!["1", ""], vec!["2", ""], vec!["3", "x"]]);
    }

    #[test]
    fn row_count_is_conserved() {
        let sources = vec![
            Source::new("one.csv", "a,b\n1,2\n\n3,4\n   \n"),
            Source::new("two.csv", "c\n5\n6\n7\n"),
            Source::new("three.csv", "a\n"),
            Source::new("four.csv", ""),
        ];
        let result = compile(&sources).unwrap();
        assert_eq!(result.row_count(), 5);
        let summary = result.summary();
        assert_eq!(summary.source_count, 4);
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.total_columns, 3);
        assert_eq!(summary.headers, vec!["a", "b", "c"]);
    }

    #[test]
    fn records_reparse_to_same_values() {
        let sources = vec![Source::new(
            "mixed.csv",
            "name,note,qty\n\" Ann \",\"said \"\"hi\"\", left\",3\nBob,\"two\nlines\",\n",
        )];
        let result = compile(&sources).unwrap();
        let reparsed = parse_rows(&result.to_csv()).unwrap();
        assert_eq!(reparsed[0].fields, result.headers().as_slice());
        for (row, record) in reparsed[1..].iter().zip(result.records()) {
            assert_eq!(row.fields, record.values());
        }
    }

    #[test]
    fn identical_runs_are_identical() {
        let sources = vec![
            Source::new("x.csv", "k,v\n1,a\n"),
            Source::new("y.csv", "v,w,k\nb,c,2\n"),
        ];
        let first = compile(&sources).unwrap();
        let second = compile(&sources).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_csv(), second.to_csv());
    }

    #[test]
    fn malformed_row_aborts_the_run() {
        let sources = vec![
            Source::new("good.csv", "a\n1\n"),
            Source::new("bad.csv", "a\n\"never closed\n"),
        ];
        match compile(&sources) {
            Err(CompileError::MalformedRow { name, row, .. }) => {
                assert_eq!(name, "bad.csv");
                assert_eq!(row, 2);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn all_empty_sources_serialize_to_nothing() {
        let sources = vec![Source::new("e1.csv", ""), Source::new("e2.csv", "\n\n")];
        let result = compile(&sources).unwrap();
        assert_eq!(result.column_count(), 0);
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.to_csv(), "");
    }

    #[test]
    fn progress_follows_source_order() {
        let sources = vec![
            Source::new("first.csv", "a\n1\n2\n"),
            Source::new("second.csv", "b\n3\n"),
        ];
        let mut events = Vec::new();
        CsvCompiler::new(CompileOptions {
            parallel_headers: false,
        })
        .compile_with_progress(&sources, |p| events.push(p))
        .unwrap();

        assert_eq!(events[0], CompileProgress::HeadersCollected { columns: 2 });
        assert!(matches!(
            &events[1],
            CompileProgress::SourceNormalized { index: 0, rows: 2, name, .. } if name == "first.csv"
        ));
        assert!(matches!(
            &events[2],
            CompileProgress::SourceNormalized { index: 1, rows: 1, .. }
        ));
    }

    #[test]
    fn write_csv_matches_to_csv() {
        let sources = vec![Source::new("w.csv", "a,b\n1,\"2,3\"\n")];
        let result = compile(&sources).unwrap();
        let mut buf = Vec::new();
        let bytes = result.write_csv(&mut buf).unwrap();
        assert_eq!(bytes as usize, buf.len());
        assert_eq!(String::from_utf8(buf).unwrap(), result.to_csv());
    }

    #[test]
    fn summary_serializes_in_camel_case() {
        let sources = vec![Source::new("s.csv", "a\n1\n")];
        let json = serde_json::to_value(compile(&sources).unwrap().summary()).unwrap();
        assert_eq!(json["sourceCount"], 1);
        assert_eq!(json["totalRows"], 1);
        assert_eq!(json["totalColumns"], 1);
        assert_eq!(json["headers"][0], "a");
    }
}
