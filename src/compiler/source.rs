//! Compilation inputs.

use super::error::CompileError;
use std::fs;
use std::io;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// One named CSV input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    name: String,
    content: String,
}

impl Source {
    /// Build a Source from text already in memory.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut content = content.into();
        if content.starts_with(UTF8_BOM) {
            content.drain(..UTF8_BOM.len_utf8());
        }
        Self {
            name: name.into(),
            content,
        }
    }

    /// Build a Source from raw bytes, which must be UTF-8.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CompileError> {
        let name = name.into();
        match String::from_utf8(bytes) {
            Ok(content) => Ok(Self::new(name, content)),
            Err(e) => Err(CompileError::source_read(
                &name,
                io::Error::new(io::ErrorKind::InvalidData, e),
            )),
        }
    }

    /// Read a Source from disk, named by its path.
    pub fn from_path(path: &Path) -> Result<Self, CompileError> {
        Self::from_path_with_limit(path, None)
    }

    /// Read a Source from disk, refusing files larger than `max_bytes`.
    pub fn from_path_with_limit(path: &Path, max_bytes: Option<u64>) -> Result<Self, CompileError> {
        let name = path.display().to_string();

        if let Some(limit) = max_bytes {
            let len = fs::metadata(path)
                .map_err(|e| CompileError::source_read(&name, e))?
                .len();
            if len > limit {
                return Err(CompileError::source_read(
                    &name,
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("file is {} bytes, limit is {}", len, limit),
                    ),
                ));
            }
        }

        let bytes = fs::read(path).map_err(|e| CompileError::source_read(&name, e))?;
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Check a path's extension against an allow-list (case-insensitive).
/// An empty list accepts every path.
pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn strips_byte_order_mark() {
        let source = Source::new("bom.csv", "\u{feff}a,b\n1,2\n");
        assert_eq!(source.content(), "a,b\n1,2\n");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = Source::from_bytes("bad.csv", vec![b'a', 0xff, b'\n']).unwrap_err();
        match err {
            CompileError::SourceRead { name, source } => {
                assert_eq!(name, "bad.csv");
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_source_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = Source::from_path(&path).unwrap_err();
        assert!(matches!(err, CompileError::SourceRead { ref name, .. } if name.ends_with("nope.csv")));
    }

    #[test]
    fn size_limit_is_enforced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();

        assert!(Source::from_path_with_limit(file.path(), Some(4)).is_err());
        let source = Source::from_path_with_limit(file.path(), Some(1024)).unwrap();
        assert_eq!(source.content(), "a,b\n1,2\n");
    }

    #[test]
    fn extension_filter() {
        let csv = vec!["csv".to_string()];
        assert!(has_allowed_extension(Path::new("data/A.CSV"), &csv));
        assert!(!has_allowed_extension(Path::new("data/a.txt"), &csv));
        assert!(!has_allowed_extension(Path::new("data/noext"), &csv));
        assert!(has_allowed_extension(Path::new("data/a.txt"), &[]));
    }
}
