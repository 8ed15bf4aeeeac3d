//! Control Panel Widget
//! Left side panel with the input file queue, actions, progress and summary.

use csv_compiler::CompileSummary;
use egui::{Color32, RichText, ScrollArea};
use std::path::{Path, PathBuf};

/// Left side control panel with file selection and compile controls.
pub struct ControlPanel {
    pub files: Vec<PathBuf>,
    pub summary: Option<CompileSummary>,
    pub progress: f32,
    pub status: String,
    pub is_compiling: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            summary: None,
            progress: 0.0,
            status: "Ready".to_string(),
            is_compiling: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue files, skipping ones already queued. Returns how many were added.
    pub fn add_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> usize {
        let mut added = 0;
        for path in paths {
            if !self.files.contains(&path) {
                self.files.push(path);
                added += 1;
            }
        }
        added
    }

    /// Remove a queued file. The queue is frozen while a compile runs.
    pub fn remove_file(&mut self, index: usize) -> bool {
        if self.is_compiling || index >= self.files.len() {
            return false;
        }
        self.files.remove(index);
        true
    }

    /// Drop the queue and any previous result.
    pub fn reset(&mut self) {
        self.files.clear();
        self.summary = None;
        self.set_progress(0.0, "Ready");
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📑 CSV Compiler")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Merge files with different columns")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Input Files Section =====
        ui.label(
            RichText::new(format!("📁 Input Files ({})", self.files.len()))
                .size(14.0)
                .strong(),
        );
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if self.files.is_empty() {
                    ui.label(
                        RichText::new("Drop CSV files here or browse")
                            .size(12.0)
                            .color(Color32::GRAY),
                    );
                    return;
                }

                let editable = !self.is_compiling;
                ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    for (i, path) in self.files.iter().enumerate() {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(format!("{}.", i + 1)).color(Color32::GRAY));
                            ui.label(RichText::new(file_label(path)).size(12.0))
                                .on_hover_text(path.display().to_string());
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.add_enabled_ui(editable, |ui| {
                                        if ui.small_button("✖").clicked() {
                                            action = ControlPanelAction::RemoveFile(i);
                                        }
                                    });
                                },
                            );
                        });
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.is_compiling, |ui| {
                if ui.button("📂 Add Files").clicked() {
                    action = ControlPanelAction::AddFiles;
                }
                if ui.button("Clear").clicked() {
                    action = ControlPanelAction::Clear;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.files.is_empty() && !self.is_compiling, |ui| {
                let button = egui::Button::new(RichText::new("▶ Compile").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Compile;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.summary.is_some() && !self.is_compiling, |ui| {
                let save_button = egui::Button::new(RichText::new("💾 Save CSV").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(save_button).clicked() {
                    action = ControlPanelAction::SaveCsv;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.is_compiling),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.summary.is_some() {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        // ===== Summary Section =====
        if let Some(summary) = &self.summary {
            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
            ui.label(RichText::new("🧾 Summary").size(14.0).strong());
            ui.add_space(5.0);

            egui::Grid::new("summary_grid")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Files:");
                    ui.label(summary.source_count.to_string());
                    ui.end_row();
                    ui.label("Rows:");
                    ui.label(summary.total_rows.to_string());
                    ui.end_row();
                    ui.label("Columns:");
                    ui.label(summary.total_columns.to_string());
                    ui.end_row();
                });

            ui.add_space(5.0);
            egui::CollapsingHeader::new("Headers")
                .default_open(false)
                .show(ui, |ui| {
                    for header in &summary.headers {
                        ui.label(RichText::new(header).size(12.0).monospace());
                    }
                });
        }

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    AddFiles,
    RemoveFile(usize),
    Clear,
    Compile,
    SaveCsv,
}
