//! CSV Compiler - merge CSV files with differing columns
//!
//! With file arguments it compiles on the command line; without, it opens the
//! desktop window.

mod gui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use csv_compiler::compiler::{has_allowed_extension, CompiledResult, CsvCompiler, Source};
use csv_compiler::{logging, AppConfig};
use eframe::egui;
use gui::CompilerApp;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "csv_compiler",
    version,
    about = "Merge CSV files with differing columns into one CSV"
)]
struct Cli {
    /// Input files, merged in the order given. Opens the window when empty.
    files: Vec<PathBuf>,

    /// Output file, or `-` for stdout. Defaults to `output_file_name`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the compile summary as JSON.
    #[arg(long)]
    summary_json: bool,

    /// Read header rows one source at a time.
    #[arg(long)]
    sequential: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.sequential {
        config.parallel_headers = false;
    }

    if cli.files.is_empty() {
        run_gui(config)
    } else {
        run_cli(&cli, &config)
    }
}

fn run_gui(config: AppConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 560.0])
            .with_drag_and_drop(true)
            .with_title("CSV Compiler"),
        ..Default::default()
    };

    eframe::run_native(
        "CSV Compiler",
        options,
        Box::new(|cc| Ok(Box::new(CompilerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to open window: {e}"))
}

fn run_cli(cli: &Cli, config: &AppConfig) -> Result<()> {
    for path in &cli.files {
        if !has_allowed_extension(path, &config.allowed_extensions) {
            bail!("Only CSV files are allowed: '{}'", path.display());
        }
    }

    let result = compile_files(&cli.files, config).context("Compilation failed")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_file_name));
    let to_stdout = output.as_os_str() == "-";

    let bytes = if to_stdout {
        result.write_csv(BufWriter::new(io::stdout().lock()))?
    } else {
        write_output(&result, &output)?
    };

    let summary = result.summary();
    let target = if to_stdout {
        "stdout".to_string()
    } else {
        output.display().to_string()
    };
    let message = format!(
        "Successfully compiled {} files into {}",
        summary.source_count, target
    );
    info!(
        rows = summary.total_rows,
        columns = summary.total_columns,
        bytes,
        "{message}"
    );

    if cli.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        if to_stdout {
            eprintln!("{json}");
        } else {
            println!("{json}");
        }
    } else if !to_stdout {
        println!(
            "{message} ({} rows, {} columns)",
            summary.total_rows, summary.total_columns
        );
    }

    Ok(())
}

fn compile_files(paths: &[PathBuf], config: &AppConfig) -> Result<CompiledResult> {
    let sources = paths
        .iter()
        .map(|path| Source::from_path_with_limit(path, config.max_source_bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let result = CsvCompiler::new(config.compile_options()).compile(&sources)?;
    Ok(result)
}

fn write_output(result: &CompiledResult, path: &Path) -> Result<u64> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
    result
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}
