//! CSV Compiler - merge CSV files with differing columns
//!
//! Every input row is projected onto the union of all input headers, with
//! missing columns left empty, and the result is written back as one CSV.

pub mod compiler;
pub mod config;
pub mod logging;

pub use compiler::{
    CompileError, CompileOptions, CompileSummary, CompiledResult, CsvCompiler, HeaderSet,
    NormalizedRecord, Source,
};
pub use config::AppConfig;
