//! Header Collector
//! First pass: the ordered union of every Source's header row.

use super::error::CompileError;
use super::parser::Rows;
use super::source::Source;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Ordered set of unique column names, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderSet {
    names: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name. Returns false (and changes nothing) if already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.positions.contains_key(name) {
            return false;
        }
        self.positions.insert(name.to_string(), self.names.len());
        self.names.push(name.to_string());
        true
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<S: AsRef<str>> FromIterator<S> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// Builds the HeaderSet for a compilation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderCollector {
    parallel: bool,
}

impl HeaderCollector {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Union of all header rows, merged in Source order.
    ///
    /// With `parallel` set the header rows are parsed concurrently; the merge
    /// still walks the results in the order the Sources were given.
    pub fn collect(&self, sources: &[Source]) -> Result<HeaderSet, CompileError> {
        // Gather every outcome first so the reported error is the first one
        // in Source order, not the first thread to fail.
        let outcomes: Vec<Result<Vec<String>, CompileError>> = if self.parallel {
            sources.par_iter().map(read_header).collect()
        } else {
            sources.iter().map(read_header).collect()
        };
        let per_source = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

        let mut headers = HeaderSet::new();
        for (source, names) in sources.iter().zip(&per_source) {
            let added = names.iter().filter(|name| headers.insert(name)).count();
            debug!(source = source.name(), columns = names.len(), added, "Collected headers");
        }
        Ok(headers)
    }
}

/// Header row of one Source: its first non-blank row, or nothing.
pub fn read_header(source: &Source) -> Result<Vec<String>, CompileError> {
    match Rows::new(source.content()).next() {
        Some(Ok(row)) => Ok(row.fields),
        Some(Err(e)) => Err(CompileError::malformed(source.name(), e)),
        None => Ok(Vec::new()),
    }
}
