//! Compiling real files from disk through the library API.

use csv_compiler::compiler::{parse_rows, CompileError};
use csv_compiler::{CompileOptions, CsvCompiler, Source};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_sources(dir: &TempDir, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}

fn load(paths: &[PathBuf]) -> Vec<Source> {
    paths.iter().map(|p| Source::from_path(p).unwrap()).collect()
}

#[test]
fn test_merge_files_and_write_output() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(
        &dir,
        &[
            ("customers.csv", "id,name,email\n1,Ann,ann@example.com\n2,Bob,\n"),
            ("orders.csv", "id,total,note\r\n1,9.99,\"gift, wrapped\"\r\n\r\n3,5.00,\r\n"),
            ("extra.csv", "\u{feff}phone,id\n555-0100,2\n"),
        ],
    );

    let result = CsvCompiler::default().compile(&load(&paths)).unwrap();
    assert_eq!(
        result.headers().as_slice(),
        ["id", "name", "email", "total", "note", "phone"]
    );
    assert_eq!(result.row_count(), 5);

    let out_path = dir.path().join("compiled.csv");
    let bytes = result.write_csv(fs::File::create(&out_path).unwrap()).unwrap();
    let written = fs::read_to_string(&out_path).unwrap();
    assert_eq!(bytes as usize, written.len());
    assert_eq!(
        written,
        "id,name,email,total,note,phone\n\
         1,Ann,ann@example.com,,,\n\
         2,Bob,,,,\n\
         1,,,9.99,\"gift, wrapped\",\n\
         3,,,5.00,,\n\
         2,,,,,555-0100\n"
    );
}

#[test]
fn test_output_reads_back_as_same_result() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(
        &dir,
        &[
            ("a.csv", "k,\"multi\nline header\"\n1,\"  keep  \"\n"),
            ("b.csv", "z\n\"\"\"quoted\"\"\"\n"),
        ],
    );
    let first = CsvCompiler::default().compile(&load(&paths)).unwrap();

    let merged = dir.path().join("merged.csv");
    fs::write(&merged, first.to_csv()).unwrap();
    let second = CsvCompiler::default()
        .compile(&[Source::from_path(&merged).unwrap()])
        .unwrap();

    assert_eq!(first.headers(), second.headers());
    assert_eq!(first.records(), second.records());
    assert_eq!(first.to_csv(), second.to_csv());
}

#[test]
fn test_sequential_and_parallel_headers_agree() {
    let dir = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..20)
        .map(|i| (format!("f{i:02}.csv"), format!("col{},shared\n{},x\n", i % 7, i)))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), c.as_str())).collect();
    let sources = load(&write_sources(&dir, &refs));

    let parallel = CsvCompiler::new(CompileOptions {
        parallel_headers: true,
    })
    .compile(&sources)
    .unwrap();
    let sequential = CsvCompiler::new(CompileOptions {
        parallel_headers: false,
    })
    .compile(&sources)
    .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.column_count(), 8);
    assert_eq!(parallel.row_count(), 20);
}

#[test]
fn test_malformed_file_fails_whole_run() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(
        &dir,
        &[
            ("ok.csv", "a\n1\n"),
            ("bad.csv", "a,b\n1,2\n3,\"4\n"),
        ],
    );
    let err = CsvCompiler::default().compile(&load(&paths)).unwrap_err();
    match err {
        CompileError::MalformedRow { name, row, .. } => {
            assert!(name.ends_with("bad.csv"));
            assert_eq!(row, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_serialized_header_parses_as_first_row() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(&dir, &[("h.csv", "\" spaced \",\"a,b\"\nx,y\n")]);
    let result = CsvCompiler::default().compile(&load(&paths)).unwrap();
    let rows = parse_rows(&result.to_csv()).unwrap();
    assert_eq!(rows[0].fields, vec![" spaced ", "a,b"]);
    assert_eq!(rows[1].fields, vec!["x", "y"]);
}
