//! CSV Compiler Main Application
//! Main window with the control panel and the result preview.

use crate::gui::{ControlPanel, ControlPanelAction, PreviewTable};
use anyhow::Context;
use csv_compiler::compiler::{has_allowed_extension, CompileProgress, CsvCompiler, Source};
use csv_compiler::{AppConfig, CompiledResult};
use egui::SidePanel;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{info, warn};

/// Compile result from background thread
enum CompileMessage {
    Progress(f32, String),
    Complete(CompiledResult),
    Error(String),
}

/// Main application window.
pub struct CompilerApp {
    config: AppConfig,
    control_panel: ControlPanel,
    preview: PreviewTable,
    result: Option<CompiledResult>,

    // Async compilation
    compile_rx: Option<Receiver<CompileMessage>>,
}

impl CompilerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            config,
            control_panel: ControlPanel::new(),
            preview: PreviewTable::new(),
            result: None,
            compile_rx: None,
        }
    }

    /// Queue files, dropping anything the extension filter rejects.
    fn queue_files(&mut self, paths: Vec<PathBuf>) {
        let (accepted, rejected): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .partition(|p| has_allowed_extension(p, &self.config.allowed_extensions));

        let added = self.control_panel.add_files(accepted);
        if rejected.is_empty() {
            self.control_panel
                .set_progress(0.0, &format!("Added {} file(s)", added));
        } else {
            warn!(count = rejected.len(), "Skipped files with unsupported extension");
            self.control_panel.set_progress(
                0.0,
                &format!(
                    "Added {} file(s); skipped {} (only CSV files are allowed)",
                    added,
                    rejected.len()
                ),
            );
        }
    }

    fn handle_add_files(&mut self) {
        let extensions: Vec<&str> = self
            .config
            .allowed_extensions
            .iter()
            .map(String::as_str)
            .collect();
        let mut dialog = rfd::FileDialog::new();
        if !extensions.is_empty() {
            dialog = dialog.add_filter("CSV Files", &extensions);
        }
        if let Some(paths) = dialog.pick_files() {
            self.queue_files(paths);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.control_panel.is_compiling {
            return;
        }
        let paths: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !paths.is_empty() {
            self.queue_files(paths);
        }
    }

    fn handle_remove_file(&mut self, index: usize) {
        self.control_panel.remove_file(index);
    }

    /// Discard the queue and the previous run's result.
    fn handle_clear(&mut self) {
        self.control_panel.reset();
        self.preview.clear();
        self.result = None;
    }

    /// Start compilation in background thread
    fn start_compile(&mut self) {
        if self.control_panel.is_compiling || self.control_panel.files.is_empty() {
            return;
        }

        let paths = self.control_panel.files.clone();
        let config = self.config.clone();

        let (tx, rx) = channel();
        self.compile_rx = Some(rx);
        self.control_panel.is_compiling = true;
        self.control_panel.summary = None;
        self.result = None;
        self.preview.clear();
        self.control_panel.set_progress(0.0, "Reading files...");

        thread::spawn(move || {
            Self::run_compile(tx, paths, config);
        });
    }

    /// Run compilation (called from background thread)
    fn run_compile(tx: Sender<CompileMessage>, paths: Vec<PathBuf>, config: AppConfig) {
        match Self::compile_paths(&tx, &paths, &config) {
            Ok(result) => {
                let _ = tx.send(CompileMessage::Complete(result));
            }
            Err(e) => {
                let _ = tx.send(CompileMessage::Error(format!("{:#}", e)));
            }
        }
    }

    fn compile_paths(
        tx: &Sender<CompileMessage>,
        paths: &[PathBuf],
        config: &AppConfig,
    ) -> anyhow::Result<CompiledResult> {
        let mut sources = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            let _ = tx.send(CompileMessage::Progress(
                20.0 * i as f32 / paths.len() as f32,
                format!("Reading {}...", path.display()),
            ));
            sources.push(Source::from_path_with_limit(path, config.max_source_bytes)?);
        }

        let _ = tx.send(CompileMessage::Progress(20.0, "Collecting headers...".to_string()));

        let result = CsvCompiler::new(config.compile_options())
            .compile_with_progress(&sources, |progress| {
                let message = match progress {
                    CompileProgress::HeadersCollected { columns } => CompileMessage::Progress(
                        40.0,
                        format!("Found {} columns, normalizing rows...", columns),
                    ),
                    CompileProgress::SourceNormalized {
                        index,
                        total,
                        name,
                        rows,
                    } => CompileMessage::Progress(
                        40.0 + 55.0 * (index + 1) as f32 / total as f32,
                        format!("Normalized {} rows from {}", rows, name),
                    ),
                };
                let _ = tx.send(message);
            })
            .context("Compilation failed")?;

        Ok(result)
    }

    /// Check for compilation results
    fn check_compile_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let rx = self.compile_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(message) = rx.try_recv() {
                match message {
                    CompileMessage::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    CompileMessage::Complete(result) => {
                        let summary = result.summary();
                        self.preview.set_result(&result, self.config.preview_rows);
                        self.control_panel.set_progress(
                            100.0,
                            &format!(
                                "Complete! Compiled {} files: {} rows, {} columns",
                                summary.source_count, summary.total_rows, summary.total_columns
                            ),
                        );
                        self.control_panel.summary = Some(summary);
                        self.result = Some(result);
                        self.control_panel.is_compiling = false;
                        should_keep_receiver = false;
                    }
                    CompileMessage::Error(error) => {
                        warn!(%error, "Compilation failed");
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.control_panel.is_compiling = false;
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.compile_rx = Some(rx);
            }
        }
    }

    /// Handle CSV export - serialize the result to a user-chosen file
    fn handle_save_csv(&mut self) {
        let Some(result) = &self.result else {
            self.control_panel.set_progress(0.0, "Nothing to save");
            return;
        };

        // Ask user for output location
        let output_path = match rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(&self.config.output_file_name)
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match save_result(result, &output_path) {
            Ok(bytes) => {
                info!(path = %output_path.display(), bytes, "Saved compiled CSV");
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Complete! Saved {} rows to {}",
                        result.row_count(),
                        output_path.display()
                    ),
                );
                if self.config.open_after_save {
                    if let Err(e) = open::that(&output_path) {
                        warn!(error = %e, "Failed to open saved file");
                    }
                }
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {:#}", e));
            }
        }
    }
}

fn save_result(result: &CompiledResult, path: &Path) -> anyhow::Result<u64> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    result
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write '{}'", path.display()))
}

impl eframe::App for CompilerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_compile_results();
        self.handle_dropped_files(ctx);

        // Request repaint while compiling
        if self.control_panel.is_compiling {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::AddFiles => self.handle_add_files(),
                        ControlPanelAction::RemoveFile(index) => self.handle_remove_file(index),
                        ControlPanelAction::Clear => self.handle_clear(),
                        ControlPanelAction::Compile => self.start_compile(),
                        ControlPanelAction::SaveCsv => self.handle_save_csv(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Preview
        egui::CentralPanel::default().show(ctx, |ui| {
            self.preview.show(ui);
        });
    }
}
