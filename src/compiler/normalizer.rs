//! Row Normalizer
//! Second pass: project every data row onto the final HeaderSet.

use super::error::CompileError;
use super::headers::HeaderSet;
use super::parser::{ParsedRow, Rows};
use super::source::Source;
use tracing::debug;

/// A data row keyed by its own Source's header positions.
///
/// Short rows are padded with empty strings and long rows lose their extra
/// trailing fields, so `values.len()` always equals the header count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    pub fn new(header_count: usize, mut values: Vec<String>) -> Self {
        values.resize(header_count, String::new());
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A row with one value per HeaderSet column, in HeaderSet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    values: Vec<String>,
}

impl NormalizedRecord {
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Value for a column name of `headers`, the set this record was built from.
    pub fn get_by_name(&self, headers: &HeaderSet, name: &str) -> Option<&str> {
        headers.position(name).and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Where each HeaderSet column is found in one Source's rows.
struct Projection {
    columns: Vec<Option<usize>>,
}

impl Projection {
    /// With repeated header names in a Source the last one wins.
    fn new(source_headers: &[String], headers: &HeaderSet) -> Self {
        let columns = headers
            .iter()
            .map(|name| source_headers.iter().rposition(|h| h == name))
            .collect();
        Self { columns }
    }

    fn apply(&self, record: &Record) -> NormalizedRecord {
        let values = self
            .columns
            .iter()
            .map(|col| col.map(|i| record.values[i].clone()).unwrap_or_default())
            .collect();
        NormalizedRecord { values }
    }
}

/// Normalizes the data rows of a Source against a fixed HeaderSet.
pub struct RowNormalizer<'a> {
    headers: &'a HeaderSet,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(headers: &'a HeaderSet) -> Self {
        Self { headers }
    }

    /// One NormalizedRecord per non-blank data row, in row order.
    pub fn normalize(&self, source: &Source) -> Result<Vec<NormalizedRecord>, CompileError> {
        let mut rows = Rows::new(source.content());

        let source_headers = match rows.next() {
            Some(Ok(ParsedRow { fields, .. })) => fields,
            Some(Err(e)) => return Err(CompileError::malformed(source.name(), e)),
            None => {
                debug!(source = source.name(), "Source has no header row");
                return Ok(Vec::new());
            }
        };

        let projection = Projection::new(&source_headers, self.headers);
        let mut out = Vec::new();
        for row in rows {
            let row = row.map_err(|e| CompileError::malformed(source.name(), e))?;
            let record = Record::new(source_headers.len(), row.fields);
            out.push(projection.apply(&record));
        }

        debug!(source = source.name(), rows = out.len(), "Normalized source");
        Ok(out)
    }
}
